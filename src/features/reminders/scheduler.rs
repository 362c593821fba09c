//! # Reminder Scheduler
//!
//! The evaluation loop. A single interval-driven task scans the stored
//! reminder collection, fires anything due through the dispatcher, and
//! commits the completed state back to the store. One loop per scheduler;
//! `start` while running is a no-op, as is a second `stop`.
//!
//! Ordering within a tick follows the stored snapshot, never a re-sort, so
//! firing order is deterministic. Dispatch happens before commit: a crash in
//! between re-fires the reminder on the next tick, which is the accepted
//! tradeoff for never losing one.
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 2.1.0: Retry-once persistence with store-error signal on second failure
//! - 2.0.0: Interval loop moved onto tokio, explicit start/stop lifecycle
//! - 1.0.0: Initial evaluation pass

use crate::core::model::Reminder;
use crate::features::notify::NotificationDispatcher;
use crate::signals::SignalHub;
use crate::storage::Store;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Default interval between evaluation ticks
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(10);

/// Owns the evaluation loop. Constructed once by the process entry point;
/// clones share the same lifecycle handle.
#[derive(Clone)]
pub struct ReminderScheduler {
    store: Arc<dyn Store>,
    dispatcher: Arc<NotificationDispatcher>,
    hub: SignalHub,
    interval: Duration,
    running: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn Store>,
        dispatcher: Arc<NotificationDispatcher>,
        hub: SignalHub,
    ) -> Self {
        ReminderScheduler {
            store,
            dispatcher,
            hub,
            interval: DEFAULT_TICK_INTERVAL,
            running: Arc::new(Mutex::new(None)),
        }
    }

    /// Override the tick interval (default 10 s)
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Begin periodic evaluation. Calling while already running is a no-op.
    ///
    /// Also kicks off a best-effort, non-blocking notification permission
    /// request so the desktop channel is resolved by the first fire.
    pub async fn start(&self) {
        let mut guard = self.running.lock().await;
        if guard.is_some() {
            debug!("Reminder scheduler already running, start ignored");
            return;
        }

        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            dispatcher.request_permission().await;
        });

        let scheduler = self.clone();
        let interval = self.interval;
        let handle = tokio::spawn(async move {
            // First tick lands one full interval after start
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                ticker.tick().await;
                scheduler.run_tick(Utc::now()).await;
            }
        });
        *guard = Some(handle);
        info!("Reminder scheduler started (tick every {:?})", self.interval);
    }

    /// Cancel the evaluation loop. Idempotent.
    pub async fn stop(&self) {
        let mut guard = self.running.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
            info!("Reminder scheduler stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// One evaluation pass over fresh snapshots of both collections.
    ///
    /// Every failure inside a tick is contained to that tick; the loop keeps
    /// running whatever happens here.
    pub async fn run_tick(&self, now: DateTime<Utc>) {
        let reminders = match self.store.get_reminders() {
            Ok(reminders) => reminders,
            Err(e) => {
                error!("Tick skipped, could not read reminders: {e:#}");
                return;
            }
        };
        let tasks = match self.store.get_tasks() {
            Ok(tasks) => tasks,
            Err(e) => {
                error!("Tick skipped, could not read tasks: {e:#}");
                return;
            }
        };

        debug!("Evaluating {} reminder(s) at {}", reminders.len(), now);

        let mut fired = 0usize;
        let mut orphaned = 0usize;
        for reminder in &reminders {
            if !reminder.is_due(now) {
                continue;
            }
            match tasks.iter().find(|t| t.id == reminder.task_id) {
                Some(task) => {
                    debug!("Triggering reminder {} for task {}", reminder.id, task.id);
                    self.dispatcher.dispatch(task, reminder).await;
                    self.mark_triggered(reminder.clone(), now);
                    fired += 1;
                }
                None => {
                    // Owning task was deleted without the reminder cascade.
                    // Deliberate skip-and-keep: never fired, never deleted.
                    warn!(
                        "Reminder {} references missing task {}, leaving it pending",
                        reminder.id, reminder.task_id
                    );
                    orphaned += 1;
                }
            }
        }

        if fired > 0 || orphaned > 0 {
            info!("Tick complete: {fired} fired, {orphaned} orphaned skip(s)");
        }
    }

    /// Commit the trigger: completed flag + instant, upsert, changed signal.
    ///
    /// A failed write is retried once; a second failure is surfaced as a
    /// store-error signal and the reminder stays pending so the next tick
    /// fires it again.
    fn mark_triggered(&self, mut reminder: Reminder, now: DateTime<Utc>) {
        reminder.is_completed = true;
        reminder.completed_at = Some(now);

        if let Err(first) = self.store.save_reminder(&reminder) {
            warn!(
                "Persisting triggered reminder {} failed, retrying once: {first:#}",
                reminder.id
            );
            if let Err(second) = self.store.save_reminder(&reminder) {
                error!(
                    "Could not persist triggered reminder {}: {second:#}",
                    reminder.id
                );
                self.hub
                    .notify_store_error(format!("reminder {}: {second:#}", reminder.id));
                return;
            }
        }
        self.hub.notify_changed();
    }
}
