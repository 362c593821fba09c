//! # Features Layer
//!
//! Feature modules built on the core types, the storage layer and the
//! signal hub.

pub mod notify;
pub mod reminders;

pub use notify::{NotificationDispatcher, Notifier, Permission};
pub use reminders::ReminderScheduler;
