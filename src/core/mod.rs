//! # Core Module
//!
//! Domain types and configuration shared across the engine.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Moved domain model in from the storage layer
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod model;

// Re-export commonly used items
pub use config::Config;
pub use model::{Priority, Recurrence, Reminder, Task, TaskStatus};
