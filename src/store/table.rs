// src/store/table.rs

//! In-memory task table shared by the store implementations.

use std::collections::HashMap;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskId, TaskStatus};

/// Map of tasks keyed by id, with the query operations of [`super::TaskStore`].
#[derive(Debug, Clone, Default)]
pub struct TaskTable {
    tasks: HashMap<TaskId, Task>,
}

/// On-disk document shape: `{"tasks": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(doc: TaskDocument) -> Result<Self> {
        let mut tasks = HashMap::with_capacity(doc.tasks.len());
        for task in doc.tasks {
            let id = task.id.clone();
            if tasks.insert(id.clone(), task).is_some() {
                bail!("duplicate task id in store document: {id}");
            }
        }
        Ok(Self { tasks })
    }

    pub fn to_document(&self) -> TaskDocument {
        TaskDocument {
            tasks: sorted(self.tasks.values().cloned().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn insert_new(&mut self, task: &Task) -> Result<()> {
        if self.tasks.contains_key(&task.id) {
            bail!("task {} already exists", task.id);
        }
        self.tasks.insert(task.id.clone(), task.clone());
        Ok(())
    }

    pub fn upsert(&mut self, task: &Task) {
        self.tasks.insert(task.id.clone(), task.clone());
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.tasks.remove(id).is_some()
    }

    pub fn remove_all(&mut self, ids: &[TaskId]) -> usize {
        ids.iter().filter(|id| self.tasks.remove(*id).is_some()).count()
    }

    pub fn select(&self, predicate: impl Fn(&Task) -> bool) -> Vec<Task> {
        sorted(
            self.tasks
                .values()
                .filter(|t| predicate(t))
                .cloned()
                .collect(),
        )
    }

    pub fn by_status_in(&self, statuses: &[TaskStatus]) -> Vec<Task> {
        self.select(|t| statuses.contains(&t.status))
    }

    pub fn due_before(&self, status: TaskStatus, now: DateTime<Utc>) -> Vec<Task> {
        self.select(|t| t.status == status && t.scheduled_at.is_some_and(|at| at <= now))
    }

    pub fn completed_before(&self, statuses: &[TaskStatus], cutoff: DateTime<Utc>) -> Vec<Task> {
        self.select(|t| {
            statuses.contains(&t.status) && t.completed_at.is_some_and(|at| at < cutoff)
        })
    }

    pub fn by_ids(&self, ids: &[TaskId]) -> Vec<Task> {
        sorted(ids.iter().filter_map(|id| self.tasks.get(id)).cloned().collect())
    }

    pub fn dependents_of(&self, id: &str) -> Vec<Task> {
        self.select(|t| t.depends_on.contains(id))
    }
}

fn sorted(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    tasks.dedup_by(|a, b| a.id == b.id);
    tasks
}
