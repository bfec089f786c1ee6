// src/engine/initiator.rs

//! Execution initiation: move due `SCHEDULED` tasks to `IN_PROGRESS`.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::dag::{self, GateDecision};
use crate::errors::{Result, TaskmasterError};
use crate::lifecycle;
use crate::task::{Task, TaskStatus};

use super::{EngineContext, RunOutcome};

/// Prefix of the note recorded when initiation fails.
pub const INITIATION_FAILURE_PREFIX: &str = "Execution initiation failed";

/// Result of trying to start one task.
#[derive(Debug, Clone, PartialEq)]
pub enum InitiationOutcome {
    /// The task is now `IN_PROGRESS`.
    Started(Task),
    /// Dependencies are not met yet; the task stays `SCHEDULED`.
    Deferred(Task),
    /// Nothing to do: no identifier, or the task is no longer `SCHEDULED`.
    Skipped(Task),
    /// Initiation failed. `task` is the `FAILED` copy when recording the
    /// failure succeeded.
    Failed { task: Option<Task>, reason: String },
}

enum Attempt {
    Started(Task),
    Skipped(Task),
}

/// Try to start a single task.
///
/// Every decision is re-made against the freshest stored copy; the passed-in
/// task only supplies the identifier.
pub async fn initiate(ctx: &EngineContext, task: Task) -> InitiationOutcome {
    if task.id.trim().is_empty() {
        return InitiationOutcome::Skipped(task);
    }

    let fresh = match ctx.load(&task.id) {
        Ok(fresh) => fresh,
        Err(err) => {
            error!(task = %task.id, error = %err, "could not load task for initiation");
            return InitiationOutcome::Failed {
                task: None,
                reason: err.to_string(),
            };
        }
    };

    if fresh.status != TaskStatus::Scheduled {
        warn!(task = %fresh.id, status = %fresh.status, "task is not SCHEDULED; skipping initiation");
        return InitiationOutcome::Skipped(fresh);
    }

    match dag::evaluate(ctx.store.as_ref(), &fresh) {
        GateDecision::Met => {}
        decision => {
            info!(task = %fresh.id, ?decision, "dependencies not met; leaving task SCHEDULED");
            return InitiationOutcome::Deferred(fresh);
        }
    }

    match try_start(ctx, fresh).await {
        Ok(Attempt::Started(task)) => {
            info!(task = %task.id, "task started");
            InitiationOutcome::Started(task)
        }
        Ok(Attempt::Skipped(task)) => InitiationOutcome::Skipped(task),
        Err(err) => {
            let reason = err.to_string();
            error!(task = %task.id, error = %reason, "execution initiation failed");
            InitiationOutcome::Failed {
                task: record_failure(ctx, &task.id, &reason),
                reason,
            }
        }
    }
}

async fn try_start(ctx: &EngineContext, task: Task) -> Result<Attempt> {
    let steps = if task.has_execution_plan() {
        None
    } else {
        info!(task = %task.id, "no execution plan; requesting one");
        Some(ctx.request_plan(&task).await?)
    };

    // The plan request can take a while; re-check against the latest state.
    let mut latest = ctx.load(&task.id)?;
    if latest.status != TaskStatus::Scheduled {
        warn!(task = %latest.id, status = %latest.status, "task changed while planning; skipping");
        return Ok(Attempt::Skipped(latest));
    }
    if let Some(steps) = steps {
        latest.execution_steps = steps;
    }

    lifecycle::start(&mut latest, ctx.clock.now())?;
    ctx.persist(&latest)?;
    Ok(Attempt::Started(latest))
}

/// Best effort: mark the task `FAILED` with a note. Errors are logged only.
fn record_failure(ctx: &EngineContext, id: &str, reason: &str) -> Option<Task> {
    let attempt = || -> Result<Task> {
        let mut task = ctx.load(id)?;
        let note = format!("{INITIATION_FAILURE_PREFIX}: {reason}");
        lifecycle::fail(&mut task, ctx.clock.now(), Some(&note))?;
        ctx.persist(&task)?;
        Ok(task)
    };

    match attempt() {
        Ok(task) => Some(task),
        Err(err) => {
            error!(task = %id, error = %err, "could not record initiation failure");
            None
        }
    }
}

/// Initiate every `SCHEDULED` task due at or before `now`, one at a time.
pub async fn initiate_due(ctx: &EngineContext, now: DateTime<Utc>) -> RunOutcome {
    let mut outcome = RunOutcome::empty();

    let due = match ctx
        .store
        .find_by_status_due_before(TaskStatus::Scheduled, now)
        .map_err(TaskmasterError::persistence)
    {
        Ok(due) => due,
        Err(err) => {
            error!(error = %err, "could not load due tasks");
            outcome.record_failure();
            return outcome;
        }
    };

    if due.is_empty() {
        info!("no tasks due for execution");
        return outcome;
    }
    info!(count = due.len(), "initiating due tasks");

    for task in due {
        match initiate(ctx, task).await {
            InitiationOutcome::Started(_) => outcome.record_success(),
            InitiationOutcome::Deferred(_) | InitiationOutcome::Skipped(_) => outcome.record_skip(),
            InitiationOutcome::Failed { .. } => outcome.record_failure(),
        }
    }

    info!(%outcome, "due tasks processed");
    outcome
}
