//! # Reminders Feature
//!
//! Periodic reminder evaluation with at-most-once trigger per reminder.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true

pub mod scheduler;

pub use scheduler::ReminderScheduler;
