#![allow(dead_code)]

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use taskmaster::config::model::{RawOracleSection, RawOrchestratorSection, RawStoreSection};
use taskmaster::config::{ConfigFile, RawConfigFile};
use taskmaster::task::{Priority, Task, TaskStatus};
use taskmaster::types::StoreMode;

/// Builder for `Task` to set up store contents directly.
///
/// Terminal statuses get a `completed_at` equal to `created_at` unless one is
/// given, so built tasks satisfy the `completed_at` invariant.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            task: Task::new(
                id.to_string(),
                format!("task {id}"),
                "",
                BTreeSet::new(),
                crate::t0(),
            ),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.task.title = title.to_string();
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.task.priority = Some(priority);
        self
    }

    pub fn duration(mut self, minutes: u32) -> Self {
        self.task.estimated_duration_minutes = Some(minutes);
        self
    }

    pub fn depends_on(mut self, id: &str) -> Self {
        self.task.depends_on.insert(id.to_string());
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.task.created_at = at;
        self
    }

    pub fn scheduled_at(mut self, at: DateTime<Utc>) -> Self {
        self.task.scheduled_at = Some(at);
        self
    }

    pub fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.task.started_at = Some(at);
        self
    }

    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.task.completed_at = Some(at);
        self
    }

    pub fn step(mut self, step: &str) -> Self {
        self.task.execution_steps.push(step.to_string());
        self
    }

    pub fn build(mut self) -> Task {
        if self.task.status.is_terminal() && self.task.completed_at.is_none() {
            self.task.completed_at = Some(self.task.created_at);
        }
        if matches!(self.task.status, TaskStatus::InProgress) && self.task.started_at.is_none() {
            self.task.started_at = Some(self.task.created_at);
        }
        self.task
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                orchestrator: RawOrchestratorSection::default(),
                oracle: RawOracleSection::default(),
                store: RawStoreSection::default(),
            },
        }
    }

    pub fn reconcile_interval(mut self, value: &str) -> Self {
        self.config.orchestrator.reconcile_interval = value.to_string();
        self
    }

    pub fn initiate_interval(mut self, value: &str) -> Self {
        self.config.orchestrator.initiate_interval = value.to_string();
        self
    }

    pub fn sweep_at(mut self, value: &str) -> Self {
        self.config.orchestrator.sweep_at = Some(value.to_string());
        self
    }

    pub fn sweep_interval(mut self, value: &str) -> Self {
        self.config.orchestrator.sweep_interval = Some(value.to_string());
        self
    }

    pub fn retention(mut self, value: &str) -> Self {
        self.config.orchestrator.retention = value.to_string();
        self
    }

    pub fn oracle_timeout(mut self, value: &str) -> Self {
        self.config.oracle.timeout = value.to_string();
        self
    }

    pub fn memory_store(mut self) -> Self {
        self.config.store.mode = StoreMode::Memory;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
