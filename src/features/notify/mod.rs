//! # Notification Feature
//!
//! Multi-channel, best-effort delivery for firing reminders. Three channels
//! run per dispatch: an audible tone, a desktop notification (or a blocking
//! prompt when permission is missing), and the in-process show-reminder
//! signal. Channels fail independently; a dead channel never blocks the
//! others, and the signal broadcast is the one guaranteed path while the
//! process is running.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.2.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.3.0: Sound channel can be disabled via config
//! - 1.2.0: Permission tri-state with idempotent request
//! - 1.1.0: Blocking prompt fallback when desktop notifications are missing
//! - 1.0.0: Initial tone + desktop + signal dispatch

pub mod channels;

pub use channels::{DesktopNotifier, PromptNotifier, ToneNotifier};

use crate::core::model::{Reminder, Task};
use crate::signals::SignalHub;
use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use tokio::sync::RwLock;

/// Desktop-notification authorization state.
///
/// `Default` means "not asked yet"; [`NotificationDispatcher::request_permission`]
/// resolves it to granted or denied and the answer sticks for the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    Default,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Granted => "granted",
            Permission::Denied => "denied",
            Permission::Default => "default",
        }
    }
}

/// One delivery channel for a firing reminder.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logs
    fn name(&self) -> &'static str;

    /// Deliver the (task, reminder) pair through this channel
    async fn notify(&self, task: &Task, reminder: &Reminder) -> Result<()>;

    /// Whether the channel's host capability is present. Used for the
    /// permission probe on the desktop channel; must never panic.
    async fn probe(&self) -> bool {
        true
    }
}

/// Fans one firing reminder out across the available channels.
pub struct NotificationDispatcher {
    tone: Box<dyn Notifier>,
    desktop: Box<dyn Notifier>,
    prompt: Box<dyn Notifier>,
    hub: SignalHub,
    permission: RwLock<Permission>,
    sound_enabled: bool,
}

impl NotificationDispatcher {
    /// Dispatcher with the standard host-facing channel backends
    pub fn new(hub: SignalHub, sound_enabled: bool) -> Self {
        Self::with_channels(
            hub,
            sound_enabled,
            Box::new(ToneNotifier::new()),
            Box::new(DesktopNotifier::new()),
            Box::new(PromptNotifier::new()),
        )
    }

    /// Dispatcher with caller-supplied channel backends
    pub fn with_channels(
        hub: SignalHub,
        sound_enabled: bool,
        tone: Box<dyn Notifier>,
        desktop: Box<dyn Notifier>,
        prompt: Box<dyn Notifier>,
    ) -> Self {
        NotificationDispatcher {
            tone,
            desktop,
            prompt,
            hub,
            permission: RwLock::new(Permission::Default),
            sound_enabled,
        }
    }

    /// Current authorization state
    pub async fn permission(&self) -> Permission {
        *self.permission.read().await
    }

    /// Resolve `Default` to granted/denied by probing the desktop channel.
    ///
    /// Idempotent: once resolved, further calls return the stored answer
    /// without probing again. Never panics when the host has no notification
    /// support at all; that just resolves to denied.
    pub async fn request_permission(&self) -> Permission {
        {
            let current = *self.permission.read().await;
            if current != Permission::Default {
                return current;
            }
        }
        let resolved = if self.desktop.probe().await {
            Permission::Granted
        } else {
            Permission::Denied
        };
        *self.permission.write().await = resolved;
        info!("Notification permission resolved: {}", resolved.as_str());
        resolved
    }

    /// Deliver a firing reminder across the channels, best-effort.
    ///
    /// Channel order is fixed: tone, then desktop-or-prompt, then the
    /// in-process signal. A failure in any channel is logged and swallowed.
    pub async fn dispatch(&self, task: &Task, reminder: &Reminder) {
        if self.sound_enabled {
            if let Err(e) = self.tone.notify(task, reminder).await {
                warn!("Channel {} failed: {e:#}", self.tone.name());
            }
        }

        if self.permission().await == Permission::Granted {
            if let Err(e) = self.desktop.notify(task, reminder).await {
                warn!("Channel {} failed: {e:#}", self.desktop.name());
            }
        } else {
            // Blocking fallback. The pause until dismissal is intentional:
            // an undelivered reminder must not be missed.
            if let Err(e) = self.prompt.notify(task, reminder).await {
                warn!("Channel {} failed: {e:#}", self.prompt.name());
            }
        }

        self.hub.notify_fired(task, reminder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Priority;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Records the reminder ids it was invoked with; optionally fails.
    struct RecordingChannel {
        channel: &'static str,
        tags: Arc<Mutex<Vec<String>>>,
        fail: bool,
        available: bool,
    }

    impl RecordingChannel {
        fn new(channel: &'static str, tags: Arc<Mutex<Vec<String>>>) -> Self {
            RecordingChannel {
                channel,
                tags,
                fail: false,
                available: true,
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingChannel {
        fn name(&self) -> &'static str {
            self.channel
        }

        async fn notify(&self, _task: &Task, reminder: &Reminder) -> Result<()> {
            self.tags
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.channel, reminder.id));
            if self.fail {
                anyhow::bail!("simulated channel failure");
            }
            Ok(())
        }

        async fn probe(&self) -> bool {
            self.available
        }
    }

    fn fixture() -> (Task, Reminder) {
        let task = Task::new("Take medication", "8mg, with water", Priority::High, None);
        let reminder = Reminder::new(&task.id, Utc::now(), None);
        (task, reminder)
    }

    fn dispatcher_with_log(
        sound_enabled: bool,
        desktop_available: bool,
    ) -> (NotificationDispatcher, Arc<Mutex<Vec<String>>>, SignalHub) {
        let hub = SignalHub::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut desktop = RecordingChannel::new("desktop", log.clone());
        desktop.available = desktop_available;
        let dispatcher = NotificationDispatcher::with_channels(
            hub.clone(),
            sound_enabled,
            Box::new(RecordingChannel::new("tone", log.clone())),
            Box::new(desktop),
            Box::new(RecordingChannel::new("prompt", log.clone())),
        );
        (dispatcher, log, hub)
    }

    #[tokio::test]
    async fn test_denied_permission_uses_fallback_channels() {
        let (dispatcher, log, hub) = dispatcher_with_log(true, false);
        let mut fired_rx = hub.subscribe_fired();
        let (task, reminder) = fixture();

        assert_eq!(dispatcher.request_permission().await, Permission::Denied);
        dispatcher.dispatch(&task, &reminder).await;

        let calls = log.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                format!("tone:{}", reminder.id),
                format!("prompt:{}", reminder.id)
            ]
        );
        // The in-process signal still goes out
        let fired = fired_rx.recv().await.unwrap();
        assert_eq!(fired.reminder.id, reminder.id);
    }

    #[tokio::test]
    async fn test_granted_permission_uses_desktop_channel() {
        let (dispatcher, log, _hub) = dispatcher_with_log(true, true);
        let (task, reminder) = fixture();

        assert_eq!(dispatcher.request_permission().await, Permission::Granted);
        dispatcher.dispatch(&task, &reminder).await;

        let calls = log.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                format!("tone:{}", reminder.id),
                format!("desktop:{}", reminder.id)
            ]
        );
    }

    #[tokio::test]
    async fn test_same_reminder_carries_same_tag_across_dispatches() {
        let (dispatcher, log, _hub) = dispatcher_with_log(false, true);
        let (task, reminder) = fixture();
        dispatcher.request_permission().await;

        dispatcher.dispatch(&task, &reminder).await;
        dispatcher.dispatch(&task, &reminder).await;

        let calls = log.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1], "re-delivery must reuse the same tag");
    }

    #[tokio::test]
    async fn test_channel_failure_does_not_abort_the_rest() {
        let hub = SignalHub::new();
        let mut fired_rx = hub.subscribe_fired();
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut tone = RecordingChannel::new("tone", log.clone());
        tone.fail = true;
        let dispatcher = NotificationDispatcher::with_channels(
            hub,
            true,
            Box::new(tone),
            Box::new(RecordingChannel::new("desktop", log.clone())),
            Box::new(RecordingChannel::new("prompt", log.clone())),
        );
        let (task, reminder) = fixture();
        dispatcher.request_permission().await;
        dispatcher.dispatch(&task, &reminder).await;

        let calls = log.lock().unwrap().clone();
        assert_eq!(calls.len(), 2, "tone failed but desktop still ran");
        assert!(fired_rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_sound_disabled_skips_tone() {
        let (dispatcher, log, _hub) = dispatcher_with_log(false, false);
        let (task, reminder) = fixture();
        dispatcher.dispatch(&task, &reminder).await;

        let calls = log.lock().unwrap().clone();
        assert_eq!(calls, vec![format!("prompt:{}", reminder.id)]);
    }

    #[tokio::test]
    async fn test_request_permission_is_idempotent() {
        let probes = Arc::new(AtomicBool::new(false));

        struct ProbeOnce {
            probes: Arc<AtomicBool>,
        }

        #[async_trait]
        impl Notifier for ProbeOnce {
            fn name(&self) -> &'static str {
                "desktop"
            }
            async fn notify(&self, _t: &Task, _r: &Reminder) -> Result<()> {
                Ok(())
            }
            async fn probe(&self) -> bool {
                assert!(
                    !self.probes.swap(true, Ordering::SeqCst),
                    "probe ran more than once"
                );
                true
            }
        }

        let hub = SignalHub::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = NotificationDispatcher::with_channels(
            hub,
            false,
            Box::new(RecordingChannel::new("tone", log.clone())),
            Box::new(ProbeOnce { probes }),
            Box::new(RecordingChannel::new("prompt", log)),
        );

        assert_eq!(dispatcher.permission().await, Permission::Default);
        assert_eq!(dispatcher.request_permission().await, Permission::Granted);
        assert_eq!(dispatcher.request_permission().await, Permission::Granted);
        assert_eq!(dispatcher.permission().await, Permission::Granted);
    }
}
