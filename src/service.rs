// src/service.rs

//! Single-task operations exposed to collaborators (CLI, an HTTP layer, ...).
//!
//! Unlike the batch jobs in [`crate::engine`], these surface the specific
//! [`TaskmasterError`] to the caller.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::dag;
use crate::engine::EngineContext;
use crate::errors::{Result, TaskmasterError};
use crate::lifecycle::{self, Enrichment};
use crate::oracle::{self, validate, AnalysisRequest};
use crate::task::{new_task_id, Task, TaskId, TaskStatus};

/// Prefix of the note recorded by [`TaskService::fail_task`].
pub const FAILURE_REASON_PREFIX: &str = "Failure reason";

/// Input for [`TaskService::create_task`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub depends_on: Vec<TaskId>,
}

impl CreateTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskId>,
    {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone)]
pub struct TaskService {
    ctx: EngineContext,
}

impl TaskService {
    pub fn new(ctx: EngineContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    /// Create, validate and enrich a task.
    ///
    /// The task is drafted and analysed in memory, then written once as
    /// `SCHEDULED`. Nothing is visible in the store until that write, so a
    /// failed analysis leaves no record for other writers to depend on or
    /// schedule.
    pub async fn create_task(&self, request: CreateTask) -> Result<Task> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(TaskmasterError::Validation(
                "task title must not be blank".to_string(),
            ));
        }

        let depends_on: BTreeSet<TaskId> = request
            .depends_on
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        self.ensure_exist(&depends_on)?;

        let id = new_task_id();
        let proposed: Vec<TaskId> = depends_on.iter().cloned().collect();
        dag::validate_dependencies(self.ctx.store.as_ref(), &id, &proposed)?;

        let mut task = Task::new(
            id,
            title,
            request.description.trim(),
            depends_on,
            self.ctx.clock.now(),
        );
        debug!(task = %task.id, title = %task.title, "task drafted; requesting analysis");

        let enrichment = match self.analyze(&task).await {
            Ok(enrichment) => enrichment,
            Err(err) => {
                warn!(task = %task.id, error = %err, "task analysis failed; nothing stored");
                return Err(err);
            }
        };
        lifecycle::mark_enriched(&mut task, enrichment)?;

        // Dependencies can be deleted while the oracle is answering.
        self.ensure_exist(&task.depends_on)?;
        self.ctx
            .store
            .create(&task)
            .map_err(TaskmasterError::persistence)?;
        info!(
            task = %task.id,
            deps = task.depends_on.len(),
            priority = ?task.priority,
            minutes = ?task.estimated_duration_minutes,
            "task created and ready for scheduling"
        );
        Ok(task)
    }

    fn ensure_exist(&self, ids: &BTreeSet<TaskId>) -> Result<()> {
        for id in ids {
            let exists = self
                .ctx
                .store
                .exists(id)
                .map_err(TaskmasterError::persistence)?;
            if !exists {
                return Err(TaskmasterError::NotFound(id.clone()));
            }
        }
        Ok(())
    }

    async fn analyze(&self, task: &Task) -> Result<Enrichment> {
        let analysis = oracle::call_with_timeout(
            self.ctx.oracle_timeout,
            "task analysis",
            self.ctx.oracle.analyze(AnalysisRequest {
                title: task.title.clone(),
                description: task.description.clone(),
            }),
        )
        .await?;
        validate::validate_analysis(analysis).map_err(TaskmasterError::OracleFailure)
    }

    pub fn get_task(&self, id: &str) -> Result<Task> {
        self.ctx.load(id)
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        self.ctx
            .store
            .find_all()
            .map_err(TaskmasterError::persistence)
    }

    pub fn list_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        self.ctx
            .store
            .find_by_status(status)
            .map_err(TaskmasterError::persistence)
    }

    /// `SCHEDULED` tasks whose start time is at or before `now`.
    pub fn find_due_tasks(&self, now: DateTime<Utc>) -> Result<Vec<Task>> {
        self.ctx
            .store
            .find_by_status_due_before(TaskStatus::Scheduled, now)
            .map_err(TaskmasterError::persistence)
    }

    pub fn complete_task(&self, id: &str) -> Result<Task> {
        self.transition(id, |task, now| lifecycle::complete(task, now))
    }

    pub fn fail_task(&self, id: &str, reason: Option<&str>) -> Result<Task> {
        let note = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| format!("{FAILURE_REASON_PREFIX}: {r}"));
        self.transition(id, |task, now| lifecycle::fail(task, now, note.as_deref()))
    }

    pub fn cancel_task(&self, id: &str) -> Result<Task> {
        self.transition(id, |task, now| lifecycle::cancel(task, now))
    }

    /// Generic status change, routed through the guarded lifecycle operations.
    ///
    /// `PENDING` and `SCHEDULED` are not reachable this way; they belong to
    /// creation and the reconciler. `IN_PROGRESS` goes through the dependency
    /// gate like the initiator does.
    pub fn update_status(&self, id: &str, status: TaskStatus) -> Result<Task> {
        match status {
            TaskStatus::Completed => self.complete_task(id),
            TaskStatus::Failed => self.fail_task(id, None),
            TaskStatus::Cancelled => self.cancel_task(id),
            TaskStatus::InProgress => {
                let task = self.ctx.load(id)?;
                if !dag::dependencies_met(self.ctx.store.as_ref(), &task) {
                    return Err(TaskmasterError::Validation(format!(
                        "task {id} has unmet dependencies"
                    )));
                }
                self.transition(id, |task, now| lifecycle::start(task, now))
            }
            TaskStatus::Pending | TaskStatus::Scheduled => {
                let task = self.ctx.load(id)?;
                Err(TaskmasterError::InvalidState {
                    task: task.id,
                    from: task.status,
                    to: status,
                })
            }
        }
    }

    /// Request an execution plan and store it on the task.
    ///
    /// `COMPLETED` and `CANCELLED` tasks are returned unchanged.
    pub async fn generate_plan(&self, id: &str) -> Result<Task> {
        let task = self.ctx.load(id)?;
        if matches!(task.status, TaskStatus::Completed | TaskStatus::Cancelled) {
            warn!(task = %task.id, status = %task.status, "not planning a finished task");
            return Ok(task);
        }

        let steps = self.ctx.request_plan(&task).await?;

        let mut fresh = self.ctx.load(id)?;
        if fresh.has_execution_plan() {
            warn!(task = %fresh.id, "overwriting existing execution plan");
        }
        fresh.execution_steps = steps;
        self.ctx.persist(&fresh)?;
        info!(task = %fresh.id, steps = fresh.execution_steps.len(), "execution plan stored");
        Ok(fresh)
    }

    /// Delete a task no other task depends on.
    pub fn delete_task(&self, id: &str) -> Result<()> {
        if !self
            .ctx
            .store
            .exists(id)
            .map_err(TaskmasterError::persistence)?
        {
            return Err(TaskmasterError::NotFound(id.to_string()));
        }

        let dependents = self
            .ctx
            .store
            .find_dependents(id)
            .map_err(TaskmasterError::persistence)?;
        if !dependents.is_empty() {
            let ids: Vec<&str> = dependents.iter().map(|t| t.id.as_str()).collect();
            return Err(TaskmasterError::Validation(format!(
                "task {id} is still a dependency of {}",
                ids.join(", ")
            )));
        }

        self.ctx
            .store
            .delete(id)
            .map_err(TaskmasterError::persistence)?;
        info!(task = %id, "task deleted");
        Ok(())
    }

    /// Load, apply `change` to the fresh copy, and save.
    fn transition<F>(&self, id: &str, change: F) -> Result<Task>
    where
        F: FnOnce(&mut Task, DateTime<Utc>) -> Result<()>,
    {
        let mut task = self.ctx.load(id)?;
        let from = task.status;
        change(&mut task, self.ctx.clock.now())?;
        self.ctx.persist(&task)?;
        debug!(task = %task.id, from = %from, to = %task.status, "status updated");
        Ok(task)
    }
}
