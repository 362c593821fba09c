//! # Signal Hub
//!
//! In-process broadcast channels connecting the engine to presentation
//! layers. Fire-and-observe semantics: there is no queueing for absent
//! listeners, a subscriber attached after an emission misses it, and
//! emitting with zero subscribers is not an error.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Added store-error channel for non-fatal persistence failures
//! - 1.0.0: remindersChanged + showReminder broadcasts

use crate::core::model::{Reminder, Task};
use log::debug;
use tokio::sync::broadcast;

/// Broadcast channel capacity for all hub signals
const SIGNAL_CHANNEL_CAPACITY: usize = 64;

/// Payload of the show-reminder signal: the pair a tick just fired.
#[derive(Debug, Clone)]
pub struct FiredReminder {
    pub task: Task,
    pub reminder: Reminder,
}

/// Clone-able handle over the engine's broadcast channels.
///
/// One hub is created by the process entry point and shared by reference;
/// cloning yields another handle onto the same channels.
#[derive(Debug, Clone)]
pub struct SignalHub {
    changed_tx: broadcast::Sender<()>,
    fired_tx: broadcast::Sender<FiredReminder>,
    store_error_tx: broadcast::Sender<String>,
}

impl SignalHub {
    pub fn new() -> Self {
        let (changed_tx, _) = broadcast::channel(SIGNAL_CHANNEL_CAPACITY);
        let (fired_tx, _) = broadcast::channel(SIGNAL_CHANNEL_CAPACITY);
        let (store_error_tx, _) = broadcast::channel(SIGNAL_CHANNEL_CAPACITY);
        SignalHub {
            changed_tx,
            fired_tx,
            store_error_tx,
        }
    }

    /// Subscribe to "reminders changed": stored state mutated, re-read it.
    pub fn subscribe_changed(&self) -> broadcast::Receiver<()> {
        self.changed_tx.subscribe()
    }

    /// Subscribe to "show reminder": a reminder just fired, present it.
    pub fn subscribe_fired(&self) -> broadcast::Receiver<FiredReminder> {
        self.fired_tx.subscribe()
    }

    /// Subscribe to non-fatal persistence failures
    pub fn subscribe_store_errors(&self) -> broadcast::Receiver<String> {
        self.store_error_tx.subscribe()
    }

    pub fn notify_changed(&self) {
        // Err just means nobody is listening right now
        if self.changed_tx.send(()).is_err() {
            debug!("remindersChanged emitted with no subscribers");
        }
    }

    pub fn notify_fired(&self, task: &Task, reminder: &Reminder) {
        let fired = FiredReminder {
            task: task.clone(),
            reminder: reminder.clone(),
        };
        if self.fired_tx.send(fired).is_err() {
            debug!("showReminder emitted with no subscribers");
        }
    }

    pub fn notify_store_error(&self, message: impl Into<String>) {
        let _ = self.store_error_tx.send(message.into());
    }
}

impl Default for SignalHub {
    fn default() -> Self {
        Self::new()
    }
}
