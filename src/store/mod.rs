// src/store/mod.rs

//! Durable task storage.
//!
//! The rest of the crate only talks to [`TaskStore`]. Two implementations are
//! provided:
//! - [`MemoryTaskStore`]: process-local, lost on restart.
//! - [`FileTaskStore`]: a JSON document written atomically on every mutation.
//!
//! Both share the same query semantics through [`table::TaskTable`].

use chrono::{DateTime, Utc};

use anyhow::Result;

use crate::task::{Task, TaskId, TaskStatus};

pub mod file;
pub mod memory;
pub mod table;

pub use file::{FileTaskStore, DEFAULT_STORE_PATH};
pub use memory::MemoryTaskStore;

/// Abstract storage for tasks.
///
/// Methods take `&self`; implementations synchronise internally so a single
/// store can be shared between the service and the orchestrator jobs.
/// Query results are ordered by creation time, then id.
pub trait TaskStore: Send + Sync {
    /// Insert a new task. Fails if a task with the same id exists.
    fn create(&self, task: &Task) -> Result<()>;

    fn get(&self, id: &str) -> Result<Option<Task>>;

    fn exists(&self, id: &str) -> Result<bool>;

    fn find_all(&self) -> Result<Vec<Task>>;

    fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>>;

    fn find_by_status_in(&self, statuses: &[TaskStatus]) -> Result<Vec<Task>>;

    /// Tasks in `status` whose `scheduled_at` is at or before `now`.
    fn find_by_status_due_before(&self, status: TaskStatus, now: DateTime<Utc>) -> Result<Vec<Task>>;

    /// Tasks in one of `statuses` whose `completed_at` is strictly before `cutoff`.
    fn find_by_status_in_completed_before(
        &self,
        statuses: &[TaskStatus],
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Task>>;

    /// Batch lookup. Unknown ids are omitted from the result.
    fn find_all_by_id(&self, ids: &[TaskId]) -> Result<Vec<Task>>;

    /// Tasks whose dependency set contains `id`.
    fn find_dependents(&self, id: &str) -> Result<Vec<Task>>;

    /// Insert or replace.
    fn save(&self, task: &Task) -> Result<()>;

    /// Returns `true` if a task was removed.
    fn delete(&self, id: &str) -> Result<bool>;

    /// Remove all listed tasks in one write. Returns how many were removed.
    fn delete_all(&self, ids: &[TaskId]) -> Result<usize>;
}
