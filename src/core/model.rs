//! # Domain Model
//!
//! Task and reminder types shared by the storage layer, the scheduler and the
//! out-of-process CRUD collaborators. Field names serialize as camelCase so
//! the persisted arrays stay compatible with data written by earlier builds.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Added consistency helpers for the completion invariants
//! - 1.1.0: Recurrence kind on reminders (stored only, not evaluated)
//! - 1.0.0: Initial task/reminder types

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(anyhow::anyhow!("Invalid priority: {}", s)),
        }
    }
}

/// Lifecycle status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in-progress"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(anyhow::anyhow!("Invalid task status: {}", s)),
        }
    }
}

/// Recurrence kind carried on a reminder.
///
/// Stored and round-tripped but never evaluated: a fired recurring reminder
/// is marked completed and is not rescheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
}

/// A user task. Owned by the store; the reminder engine only reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new pending task
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: description.into(),
            priority,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            due_date,
            completed_at: None,
        }
    }

    /// Invariant check: completedAt is set iff status is completed
    pub fn is_consistent(&self) -> bool {
        (self.status == TaskStatus::Completed) == self.completed_at.is_some()
    }
}

/// A reminder tied to a task by id.
///
/// The reference is not ownership: a reminder can outlive its task if the
/// deletion cascade was skipped, in which case the scheduler skips it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub task_id: String,
    pub remind_at: DateTime<Utc>,
    pub is_recurring: bool,
    pub recurrence_type: Option<Recurrence>,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Reminder {
    /// Create a new pending reminder for a task
    pub fn new(
        task_id: impl Into<String>,
        remind_at: DateTime<Utc>,
        recurrence: Option<Recurrence>,
    ) -> Self {
        Reminder {
            id: Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            remind_at,
            is_recurring: recurrence.is_some(),
            recurrence_type: recurrence,
            is_completed: false,
            completed_at: None,
        }
    }

    /// Whether this reminder is eligible to fire at `now`.
    ///
    /// The due instant itself counts as due; staleness is irrelevant, an
    /// arbitrarily old pending reminder is still eligible.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed && self.remind_at <= now
    }

    /// Invariant check: completedAt is set iff the completed flag is set
    pub fn is_consistent(&self) -> bool {
        self.is_completed == self.completed_at.is_some()
    }
}
