//! # Storage Layer
//!
//! Durable key-value persistence for the two collections. Each collection is
//! one JSON array under a stable key, read and rewritten wholesale on every
//! operation; at this scale (tens of records) whole-collection replace is
//! cheaper than anything indexed. There is no schema version field.
//!
//! The [`Store`] trait is the boundary the scheduler shares with the task
//! CRUD collaborators: both sides read full snapshots and write back narrow
//! updates. Snapshots are independent copies; mutating a returned `Vec` never
//! touches stored state.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: JSON-file backend with atomic replace, trait extracted
//! - 1.0.0: Initial in-memory implementation

use crate::core::model::{Reminder, Task};
use anyhow::{Context, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Stable key for the task collection (matches data written by earlier builds)
pub const TASKS_KEY: &str = "important_tasks";

/// Stable key for the reminder collection
pub const REMINDERS_KEY: &str = "important_reminders";

/// Read/write contract over the two persisted collections.
///
/// Reads return full independent snapshots. `save_*` single-record calls are
/// upserts by id; `save_all_*` calls replace the whole collection and exist
/// for external reordering, the scheduler never uses them.
pub trait Store: Send + Sync {
    fn get_tasks(&self) -> Result<Vec<Task>>;
    fn get_reminders(&self) -> Result<Vec<Reminder>>;

    /// Upsert one task by id
    fn save_task(&self, task: &Task) -> Result<()>;
    /// Replace the task collection (external reorder/update path)
    fn save_all_tasks(&self, tasks: &[Task]) -> Result<()>;
    /// Delete a task and cascade its reminders
    fn delete_task(&self, task_id: &str) -> Result<()>;
    /// Delete several tasks, cascading reminders for each
    fn delete_tasks(&self, task_ids: &[String]) -> Result<()>;

    /// Upsert one reminder by id. The only write the scheduler performs.
    fn save_reminder(&self, reminder: &Reminder) -> Result<()>;
    /// Replace the reminder collection (external reorder/update path)
    fn save_all_reminders(&self, reminders: &[Reminder]) -> Result<()>;
    fn delete_reminder(&self, reminder_id: &str) -> Result<()>;
    fn delete_reminders(&self, reminder_ids: &[String]) -> Result<()>;
    fn delete_reminders_for_task(&self, task_id: &str) -> Result<()>;
}

/// File-backed store: one `<key>.json` array per collection in a data dir.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
        Ok(JsonStore { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let path = self.path_for(key);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        serde_json::from_str(&raw).with_context(|| format!("Corrupt collection under {key}"))
    }

    /// Write the full collection, replacing atomically via a temp file so a
    /// crash mid-write can never leave a half-written array behind.
    fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        let raw = serde_json::to_string(items)?;
        std::fs::write(&tmp, raw)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        debug!("[storage] wrote {} item(s) under {}", items.len(), key);
        Ok(())
    }
}

impl Store for JsonStore {
    fn get_tasks(&self) -> Result<Vec<Task>> {
        self.read_collection(TASKS_KEY)
    }

    fn get_reminders(&self) -> Result<Vec<Reminder>> {
        self.read_collection(REMINDERS_KEY)
    }

    fn save_task(&self, task: &Task) -> Result<()> {
        let mut tasks = self.get_tasks()?;
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task.clone(),
            None => tasks.push(task.clone()),
        }
        self.write_collection(TASKS_KEY, &tasks)
    }

    fn save_all_tasks(&self, tasks: &[Task]) -> Result<()> {
        self.write_collection(TASKS_KEY, tasks)
    }

    fn delete_task(&self, task_id: &str) -> Result<()> {
        let tasks: Vec<Task> = self
            .get_tasks()?
            .into_iter()
            .filter(|t| t.id != task_id)
            .collect();
        self.write_collection(TASKS_KEY, &tasks)?;
        self.delete_reminders_for_task(task_id)
    }

    fn delete_tasks(&self, task_ids: &[String]) -> Result<()> {
        let tasks: Vec<Task> = self
            .get_tasks()?
            .into_iter()
            .filter(|t| !task_ids.contains(&t.id))
            .collect();
        self.write_collection(TASKS_KEY, &tasks)?;
        for id in task_ids {
            self.delete_reminders_for_task(id)?;
        }
        Ok(())
    }

    fn save_reminder(&self, reminder: &Reminder) -> Result<()> {
        let mut reminders = self.get_reminders()?;
        match reminders.iter_mut().find(|r| r.id == reminder.id) {
            Some(existing) => *existing = reminder.clone(),
            None => reminders.push(reminder.clone()),
        }
        self.write_collection(REMINDERS_KEY, &reminders)
    }

    fn save_all_reminders(&self, reminders: &[Reminder]) -> Result<()> {
        self.write_collection(REMINDERS_KEY, reminders)
    }

    fn delete_reminder(&self, reminder_id: &str) -> Result<()> {
        let reminders: Vec<Reminder> = self
            .get_reminders()?
            .into_iter()
            .filter(|r| r.id != reminder_id)
            .collect();
        self.write_collection(REMINDERS_KEY, &reminders)
    }

    fn delete_reminders(&self, reminder_ids: &[String]) -> Result<()> {
        let reminders: Vec<Reminder> = self
            .get_reminders()?
            .into_iter()
            .filter(|r| !reminder_ids.contains(&r.id))
            .collect();
        self.write_collection(REMINDERS_KEY, &reminders)
    }

    fn delete_reminders_for_task(&self, task_id: &str) -> Result<()> {
        let reminders: Vec<Reminder> = self
            .get_reminders()?
            .into_iter()
            .filter(|r| r.task_id != task_id)
            .collect();
        self.write_collection(REMINDERS_KEY, &reminders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Priority;
    use chrono::Utc;

    fn open_temp_store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_empty_store_reads_empty() {
        let (_dir, store) = open_temp_store();
        assert!(store.get_tasks().unwrap().is_empty());
        assert!(store.get_reminders().unwrap().is_empty());
    }

    #[test]
    fn test_save_reminder_upserts_by_id() {
        let (_dir, store) = open_temp_store();
        let mut reminder = Reminder::new("t-1", Utc::now(), None);
        store.save_reminder(&reminder).unwrap();
        assert_eq!(store.get_reminders().unwrap().len(), 1);

        reminder.is_completed = true;
        reminder.completed_at = Some(Utc::now());
        store.save_reminder(&reminder).unwrap();

        let reminders = store.get_reminders().unwrap();
        assert_eq!(reminders.len(), 1);
        assert!(reminders[0].is_completed);
    }

    #[test]
    fn test_save_all_replaces_and_keeps_order() {
        let (_dir, store) = open_temp_store();
        let a = Reminder::new("t-1", Utc::now(), None);
        let b = Reminder::new("t-2", Utc::now(), None);
        store.save_all_reminders(&[a.clone(), b.clone()]).unwrap();

        // External reorder: full replace with swapped order
        store.save_all_reminders(&[b.clone(), a.clone()]).unwrap();
        let reminders = store.get_reminders().unwrap();
        assert_eq!(reminders[0].id, b.id);
        assert_eq!(reminders[1].id, a.id);
    }

    #[test]
    fn test_delete_task_cascades_reminders() {
        let (_dir, store) = open_temp_store();
        let task = Task::new("Call dentist", "", Priority::Low, None);
        store.save_task(&task).unwrap();
        store
            .save_reminder(&Reminder::new(&task.id, Utc::now(), None))
            .unwrap();
        store
            .save_reminder(&Reminder::new("other-task", Utc::now(), None))
            .unwrap();

        store.delete_task(&task.id).unwrap();
        assert!(store.get_tasks().unwrap().is_empty());

        let reminders = store.get_reminders().unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].task_id, "other-task");
    }

    #[test]
    fn test_delete_reminders_by_ids() {
        let (_dir, store) = open_temp_store();
        let a = Reminder::new("t-1", Utc::now(), None);
        let b = Reminder::new("t-1", Utc::now(), None);
        let c = Reminder::new("t-2", Utc::now(), None);
        store.save_all_reminders(&[a.clone(), b.clone(), c.clone()]).unwrap();

        store.delete_reminders(&[a.id.clone(), c.id.clone()]).unwrap();
        let reminders = store.get_reminders().unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].id, b.id);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let (_dir, store) = open_temp_store();
        store
            .save_reminder(&Reminder::new("t-1", Utc::now(), None))
            .unwrap();

        let mut snapshot = store.get_reminders().unwrap();
        snapshot.clear();
        assert_eq!(store.get_reminders().unwrap().len(), 1);
    }

    #[test]
    fn test_collections_live_under_stable_keys() {
        let (dir, store) = open_temp_store();
        store
            .save_task(&Task::new("x", "", Priority::Medium, None))
            .unwrap();
        store
            .save_reminder(&Reminder::new("t", Utc::now(), None))
            .unwrap();
        assert!(dir.path().join("important_tasks.json").exists());
        assert!(dir.path().join("important_reminders.json").exists());
    }
}
