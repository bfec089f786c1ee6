// src/store/file.rs

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, info, warn};

use super::table::{TaskDocument, TaskTable};
use super::TaskStore;
use crate::fs::{FileSystem, RealFileSystem};
use crate::task::{Task, TaskId, TaskStatus};

/// Default location of the store document, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = ".taskmaster/tasks.json";

/// Stores tasks in a single JSON document.
///
/// The whole document is rewritten atomically on every mutation. A mutation
/// whose write fails leaves both the file and the in-memory view unchanged.
///
/// Writes are synchronous and run under the table lock on the calling
/// thread, so each mutation holds an async worker for one
/// serialise-and-rename of the whole document.
#[derive(Debug)]
pub struct FileTaskStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    table: Mutex<TaskTable>,
}

impl FileTaskStore {
    /// Open (or lazily create) the store at `path` on the real filesystem.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with(Arc::new(RealFileSystem), path)
    }

    pub fn open_with(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let table = load_table(fs.as_ref(), &path)?;
        info!(path = ?path, tasks = table.len(), "opened task store (file)");
        Ok(Self {
            fs,
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn table(&self) -> MutexGuard<'_, TaskTable> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply `change` to a copy of the table, persist it, then publish it.
    fn mutate<T>(&self, change: impl FnOnce(&mut TaskTable) -> Result<T>) -> Result<T> {
        let mut guard = self.table();
        let mut next = guard.clone();
        let out = change(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(out)
    }

    fn persist(&self, table: &TaskTable) -> Result<()> {
        let json = serde_json::to_vec_pretty(&table.to_document())
            .context("serializing task store document")?;
        self.fs
            .write_atomic(&self.path, &json)
            .with_context(|| format!("writing task store at {:?}", self.path))?;
        debug!(path = ?self.path, tasks = table.len(), "persisted task store (file)");
        Ok(())
    }
}

fn load_table(fs: &dyn FileSystem, path: &Path) -> Result<TaskTable> {
    if !fs.exists(path) {
        return Ok(TaskTable::new());
    }

    let contents = fs.read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(TaskTable::new());
    }

    let doc: TaskDocument = serde_json::from_str(&contents)
        .with_context(|| format!("parsing task store at {:?}", path))?;
    let table = TaskTable::from_document(doc)?;
    verify_dependency_graph(&table)?;
    Ok(table)
}

/// Reject a persisted dependency graph that contains a cycle.
///
/// Edge direction: dependency -> dependent. Dangling references are logged;
/// the dependency gate treats them as unmet.
fn verify_dependency_graph(table: &TaskTable) -> Result<()> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for task in table.iter() {
        graph.add_node(task.id.as_str());
    }

    for task in table.iter() {
        for dep in task.depends_on.iter() {
            if !table.contains(dep) {
                warn!(task = %task.id, dependency = %dep, "stored task references a missing dependency");
                continue;
            }
            graph.add_edge(dep.as_str(), task.id.as_str(), ());
        }
    }

    if let Err(cycle) = toposort(&graph, None) {
        bail!(
            "task store contains a dependency cycle involving task '{}'",
            cycle.node_id()
        );
    }
    Ok(())
}

impl TaskStore for FileTaskStore {
    fn create(&self, task: &Task) -> Result<()> {
        self.mutate(|table| table.insert_new(task))
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
        self.mutate(|table| {
            table.upsert(task);
            Ok(())
        })
    }

    fn delete(&self, id: &str) -> Result<bool> {
        if !self.table().contains(id) {
            return Ok(false);
        }
        self.mutate(|table| Ok(table.remove(id)))
    }

    fn delete_all(&self, ids: &[TaskId]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.mutate(|table| Ok(table.remove_all(ids)))
    }
}
