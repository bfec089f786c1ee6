use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use taskmaster::store::{MemoryTaskStore, TaskStore};
use taskmaster::task::{Task, TaskId, TaskStatus};

/// A `MemoryTaskStore` wrapper with switchable failures.
///
/// - `fail_reads`: every query errors.
/// - `fail_writes`: create / save / delete error.
/// - `fail_next_saves(n)`: the next `n` calls to `save` error.
/// - `panic_on_scan`: `find_by_status_in` panics, as a bug in a job would.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryTaskStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    failing_saves: AtomicUsize,
    panic_on_scan: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            inner: MemoryTaskStore::with_tasks(tasks).expect("seed tasks"),
            ..Self::default()
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_next_saves(&self, n: usize) {
        self.failing_saves.store(n, Ordering::SeqCst);
    }

    pub fn set_panic_on_scan(&self, panic: bool) {
        self.panic_on_scan.store(panic, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("injected read failure");
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("injected write failure");
        }
        Ok(())
    }
}

impl TaskStore for FlakyStore {
    fn create(&self, task: &Task) -> Result<()> {
        self.check_write()?;
        self.inner.create(task)
    }

    fn get(&self, id: &str) -> Result<Option<Task>> {
        self.check_read()?;
        self.inner.get(id)
    }

    fn exists(&self, id: &str) -> Result<bool> {
        self.check_read()?;
        self.inner.exists(id)
    }

    fn find_all(&self) -> Result<Vec<Task>> {
        self.check_read()?;
        self.inner.find_all()
    }

    fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        self.check_read()?;
        self.inner.find_by_status(status)
    }

    fn find_by_status_in(&self, statuses: &[TaskStatus]) -> Result<Vec<Task>> {
        if self.panic_on_scan.load(Ordering::SeqCst) {
            panic!("injected panic in find_by_status_in");
        }
        self.check_read()?;
        self.inner.find_by_status_in(statuses)
    }

    fn find_by_status_due_before(&self, status: TaskStatus, now: DateTime<Utc>) -> Result<Vec<Task>> {
        self.check_read()?;
        self.inner.find_by_status_due_before(status, now)
    }

    fn find_by_status_in_completed_before(
        &self,
        statuses: &[TaskStatus],
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Task>> {
        self.check_read()?;
        self.inner.find_by_status_in_completed_before(statuses, cutoff)
    }

    fn find_all_by_id(&self, ids: &[TaskId]) -> Result<Vec<Task>> {
        self.check_read()?;
        self.inner.find_all_by_id(ids)
    }

    fn find_dependents(&self, id: &str) -> Result<Vec<Task>> {
        self.check_read()?;
        self.inner.find_dependents(id)
    }

    fn save(&self, task: &Task) -> Result<()> {
        self.check_write()?;
        let remaining = self.failing_saves.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_saves.store(remaining - 1, Ordering::SeqCst);
            bail!("injected save failure");
        }
        self.inner.save(task)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        self.check_write()?;
        self.inner.delete(id)
    }

    fn delete_all(&self, ids: &[TaskId]) -> Result<usize> {
        self.check_write()?;
        self.inner.delete_all(ids)
    }
}
