// Core layer - shared types and configuration
pub mod core;

// Features layer - reminder evaluation and notification dispatch
pub mod features;

// Infrastructure - durable JSON collections
pub mod storage;

// Signals - in-process broadcast consumed by presentation layers
pub mod signals;

// Re-export core config and model for convenience
pub use crate::core::{Config, Priority, Recurrence, Reminder, Task, TaskStatus};

// Re-export feature items
pub use features::{
    // Notification dispatch
    NotificationDispatcher,
    Notifier,
    Permission,
    // Reminder evaluation
    ReminderScheduler,
};

// Re-export infrastructure items
pub use signals::{FiredReminder, SignalHub};
pub use storage::{JsonStore, Store};
