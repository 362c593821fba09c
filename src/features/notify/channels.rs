//! Host-facing channel backends.
//!
//! Both OS channels are driven through subprocesses (`aplay`, `notify-send`)
//! so a host without them degrades to a logged failure instead of a build
//! dependency. The blocking prompt is the last-resort channel and suspends
//! the calling context until dismissed.

use crate::core::model::{Reminder, Task};
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::Notifier;

/// PCM sample rate for the synthesized alert tone
pub const SAMPLE_RATE: u32 = 44_100;

const TONE_SECS: f32 = 1.0;
const START_HZ: f32 = 440.0;
const END_HZ: f32 = 880.0;
const RAMP_SECS: f32 = 0.1;
const START_GAIN: f32 = 0.5;
const END_GAIN: f32 = 0.01;

/// Synthesize the two-step rising alert tone as mono s16le samples.
///
/// An exponential sweep from A4 to A5 over the first 100 ms, held at A5
/// while the gain decays away over the full second.
pub fn rising_tone_samples() -> Vec<i16> {
    let total = (SAMPLE_RATE as f32 * TONE_SECS) as usize;
    let mut samples = Vec::with_capacity(total);
    let mut phase = 0.0f32;
    for n in 0..total {
        let t = n as f32 / SAMPLE_RATE as f32;
        let freq = if t < RAMP_SECS {
            START_HZ * (END_HZ / START_HZ).powf(t / RAMP_SECS)
        } else {
            END_HZ
        };
        let gain = START_GAIN * (END_GAIN / START_GAIN).powf(t / TONE_SECS);
        phase += 2.0 * std::f32::consts::PI * freq / SAMPLE_RATE as f32;
        samples.push((phase.sin() * gain * i16::MAX as f32) as i16);
    }
    samples
}

/// Audible alert: pipes the synthesized tone into `aplay`.
pub struct ToneNotifier;

impl ToneNotifier {
    pub fn new() -> Self {
        ToneNotifier
    }
}

impl Default for ToneNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for ToneNotifier {
    fn name(&self) -> &'static str {
        "tone"
    }

    async fn notify(&self, _task: &Task, reminder: &Reminder) -> Result<()> {
        debug!("Playing alert tone for reminder {}", reminder.id);
        let mut child = Command::new("aplay")
            .args(["-q", "-t", "raw", "-f", "S16_LE", "-r", "44100", "-c", "1"])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to spawn aplay")?;

        let mut stdin = child.stdin.take().context("aplay stdin unavailable")?;
        let samples = rising_tone_samples();
        let mut pcm = Vec::with_capacity(samples.len() * 2);
        for sample in samples {
            pcm.extend_from_slice(&sample.to_le_bytes());
        }
        stdin.write_all(&pcm).await?;
        drop(stdin);

        let status = child.wait().await?;
        if !status.success() {
            anyhow::bail!("aplay exited with {status}");
        }
        Ok(())
    }
}

/// Persistent desktop notification via `notify-send`.
///
/// The reminder id rides along as a stack tag so the host notification
/// daemon collapses re-deliveries of the same reminder into one entry.
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        DesktopNotifier
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    fn name(&self) -> &'static str {
        "desktop"
    }

    async fn notify(&self, task: &Task, reminder: &Reminder) -> Result<()> {
        let status = Command::new("notify-send")
            .arg("--urgency=critical")
            .arg("--app-name=taskwarden")
            .arg(format!("--hint=string:x-dunst-stack-tag:{}", reminder.id))
            .arg(format!("⏰ {}", task.title))
            .arg(&task.description)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .context("Failed to run notify-send")?;
        if !status.success() {
            anyhow::bail!("notify-send exited with {status}");
        }
        Ok(())
    }

    async fn probe(&self) -> bool {
        match Command::new("notify-send")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) => status.success(),
            Err(_) => false,
        }
    }
}

/// Blocking terminal prompt, used when desktop notifications are not granted.
pub struct PromptNotifier;

impl PromptNotifier {
    pub fn new() -> Self {
        PromptNotifier
    }
}

impl Default for PromptNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for PromptNotifier {
    fn name(&self) -> &'static str {
        "prompt"
    }

    async fn notify(&self, task: &Task, _reminder: &Reminder) -> Result<()> {
        // Deliberately synchronous: holds the tick until acknowledged
        dialoguer::Confirm::new()
            .with_prompt(format!("⏰ REMINDER: {} — time is up. Dismiss?", task.title))
            .default(true)
            .interact()
            .context("Blocking prompt failed")?;
        Ok(())
    }
}
