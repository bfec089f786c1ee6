// src/store/memory.rs

use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::table::TaskTable;
use super::TaskStore;
use crate::task::{Task, TaskId, TaskStatus};

/// Stores tasks in memory only.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    table: Mutex<TaskTable>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing tasks (ids must be unique).
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Result<Self> {
        let mut table = TaskTable::new();
        for task in tasks {
            table.insert_new(&task)?;
        }
        Ok(Self {
            table: Mutex::new(table),
        })
    }

    fn table(&self) -> MutexGuard<'_, TaskTable> {
        // A panic while holding the lock cannot leave the table half-written:
        // every mutation is a single map operation.
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TaskStore for MemoryTaskStore {
    fn create(&self, task: &Task) -> Result<()> {
        self.table().insert_new(task)?;
        debug!(task = %task.id, "created task (memory)");
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Task>> {
        Ok(self.table().get(id).cloned())
    }

    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.table().contains(id))
    }

    fn find_all(&self) -> Result<Vec<Task>> {
        Ok(self.table().select(|_| true))
    }

    fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        Ok(self.table().by_status_in(&[status]))
    }

    fn find_by_status_in(&self, statuses: &[TaskStatus]) -> Result<Vec<Task>> {
        Ok(self.table().by_status_in(statuses))
    }

    fn find_by_status_due_before(&self, status: TaskStatus, now: DateTime<Utc>) -> Result<Vec<Task>> {
        Ok(self.table().due_before(status, now))
    }

    fn find_by_status_in_completed_before(
        &self,
        statuses: &[TaskStatus],
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Task>> {
        Ok(self.table().completed_before(statuses, cutoff))
    }

    fn find_all_by_id(&self, ids: &[TaskId]) -> Result<Vec<Task>> {
        Ok(self.table().by_ids(ids))
    }

    fn find_dependents(&self, id: &str) -> Result<Vec<Task>> {
        Ok(self.table().dependents_of(id))
    }

    fn save(&self, task: &Task) -> Result<()> {
        self.table().upsert(task);
        debug!(task = %task.id, status = %task.status, "saved task (memory)");
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.table().remove(id))
    }

    fn delete_all(&self, ids: &[TaskId]) -> Result<usize> {
        let removed = self.table().remove_all(ids);
        debug!(removed, "deleted tasks (memory)");
        Ok(removed)
    }
}
