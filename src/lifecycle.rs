// src/lifecycle.rs

//! Task lifecycle state machine.
//!
//! Every status change in the crate goes through one of the functions here.
//! Each one checks the transition against [`TaskStatus::allowed_next_states`]
//! plus its own precondition, applies the side effects (timestamps, notes) and
//! leaves the task untouched when it returns an error.
//!
//! Preconditions that need the store (the dependency gate) are evaluated by
//! the caller against a fresh read immediately before calling in here.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::errors::{Result, TaskmasterError};
use crate::task::{Priority, Task, TaskStatus};

/// Validated result of the oracle's task analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub priority: Priority,
    pub estimated_duration_minutes: u32,
    pub suggested_subtasks: Vec<String>,
}

fn ensure_transition(task: &Task, to: TaskStatus) -> Result<()> {
    if task.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(TaskmasterError::InvalidState {
            task: task.id.clone(),
            from: task.status,
            to,
        })
    }
}

/// `PENDING -> SCHEDULED` after a successful analysis.
///
/// The task becomes schedulable; `scheduled_at` stays unset until the
/// reconciler assigns a start time.
pub fn mark_enriched(task: &mut Task, enrichment: Enrichment) -> Result<()> {
    if task.status != TaskStatus::Pending {
        return Err(TaskmasterError::InvalidState {
            task: task.id.clone(),
            from: task.status,
            to: TaskStatus::Scheduled,
        });
    }

    task.priority = Some(enrichment.priority);
    task.estimated_duration_minutes = Some(enrichment.estimated_duration_minutes);
    task.suggested_subtasks = enrichment.suggested_subtasks;
    task.status = TaskStatus::Scheduled;

    debug!(task = %task.id, priority = %enrichment.priority, "task enriched; now schedulable");
    Ok(())
}

/// `PENDING | SCHEDULED -> SCHEDULED` with a start time.
///
/// Refused when the task already carries a `scheduled_at`, so a stale or
/// duplicate suggestion never moves an existing schedule.
pub fn assign_schedule(task: &mut Task, start_at: DateTime<Utc>) -> Result<()> {
    ensure_transition(task, TaskStatus::Scheduled)?;
    if task.scheduled_at.is_some() {
        return Err(TaskmasterError::InvalidState {
            task: task.id.clone(),
            from: task.status,
            to: TaskStatus::Scheduled,
        });
    }

    task.status = TaskStatus::Scheduled;
    task.scheduled_at = Some(start_at);

    debug!(task = %task.id, scheduled_at = %start_at, "task scheduled");
    Ok(())
}

/// `SCHEDULED -> IN_PROGRESS`.
///
/// The caller has verified the dependency gate; the execution plan must
/// already be on the task.
pub fn start(task: &mut Task, now: DateTime<Utc>) -> Result<()> {
    ensure_transition(task, TaskStatus::InProgress)?;
    if !task.has_execution_plan() {
        return Err(TaskmasterError::Validation(format!(
            "task {} has no execution plan",
            task.id
        )));
    }

    task.status = TaskStatus::InProgress;
    task.started_at = Some(now);

    debug!(task = %task.id, "task started");
    Ok(())
}

/// `IN_PROGRESS -> COMPLETED`.
pub fn complete(task: &mut Task, now: DateTime<Utc>) -> Result<()> {
    ensure_transition(task, TaskStatus::Completed)?;

    task.status = TaskStatus::Completed;
    task.completed_at = Some(now);

    debug!(task = %task.id, "task completed");
    Ok(())
}

/// Any non-terminal status `-> FAILED`, appending `reason` to the notes.
pub fn fail(task: &mut Task, now: DateTime<Utc>, reason: Option<&str>) -> Result<()> {
    ensure_transition(task, TaskStatus::Failed)?;

    task.status = TaskStatus::Failed;
    task.completed_at = Some(now);
    if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
        task.append_note(now, reason);
    }

    debug!(task = %task.id, reason = reason.unwrap_or("N/A"), "task failed");
    Ok(())
}

/// Any non-terminal status `-> CANCELLED`.
pub fn cancel(task: &mut Task, now: DateTime<Utc>) -> Result<()> {
    ensure_transition(task, TaskStatus::Cancelled)?;

    task.status = TaskStatus::Cancelled;
    task.completed_at = Some(now);

    debug!(task = %task.id, "task cancelled");
    Ok(())
}

/// Check the per-task invariants that hold after every transition:
///
/// - `completed_at` is set iff the status is terminal;
/// - a `PENDING` task has no `scheduled_at`;
/// - a task that has started has a `started_at`, unless it went straight
///   from a pre-start status to `FAILED` / `CANCELLED`.
pub fn invariants_hold(task: &Task) -> bool {
    let completion_matches = task.completed_at.is_some() == task.status.is_terminal();
    let pending_unscheduled = task.status != TaskStatus::Pending || task.scheduled_at.is_none();
    let started_recorded = !matches!(task.status, TaskStatus::InProgress | TaskStatus::Completed)
        || task.started_at.is_some();
    completion_matches && pending_unscheduled && started_recorded
}
