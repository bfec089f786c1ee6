// src/engine/reconciler.rs

//! Schedule reconciliation: give unscheduled, unblocked tasks a start time.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::dag;
use crate::errors::{Result, TaskmasterError};
use crate::lifecycle;
use crate::oracle::validate::{self, ScheduledStart};
use crate::oracle::{self, ScheduleCandidate, ScheduleRequest};
use crate::task::{Task, TaskId, TaskStatus};

use super::{EngineContext, RunOutcome};

/// What happened to one accepted schedule entry.
enum Applied {
    Scheduled,
    Skipped,
}

/// Run one reconciliation pass against `reference_time`.
///
/// Never fails as a whole: store and oracle errors are logged and counted.
pub async fn reconcile(ctx: &EngineContext, reference_time: DateTime<Utc>) -> RunOutcome {
    let mut outcome = RunOutcome::empty();

    let candidates = match select_candidates(ctx) {
        Ok(candidates) => candidates,
        Err(err) => {
            error!(error = %err, "could not load scheduling candidates");
            outcome.record_failure();
            return outcome;
        }
    };

    if candidates.is_empty() {
        info!("no tasks ready to schedule");
        return outcome;
    }
    info!(count = candidates.len(), reference = %reference_time, "requesting schedule");

    let offered: HashSet<TaskId> = candidates.iter().map(|t| t.id.clone()).collect();
    let request = ScheduleRequest {
        reference_time,
        tasks: candidates.iter().map(ScheduleCandidate::from_task).collect(),
    };

    let suggestion = match oracle::call_with_timeout(
        ctx.oracle_timeout,
        "schedule suggestion",
        ctx.oracle.schedule(request),
    )
    .await
    {
        Ok(suggestion) => suggestion,
        Err(err) => {
            warn!(error = %err, count = offered.len(), "schedule suggestion failed; will retry next run");
            outcome.failed += offered.len() as u64;
            return outcome;
        }
    };

    let schedule = validate::validate_schedule(suggestion, &offered);
    for rejected in &schedule.rejected {
        warn!(
            task = rejected.task_id.as_deref().unwrap_or("<none>"),
            reason = %rejected.reason,
            "discarding schedule entry"
        );
        outcome.record_failure();
    }

    for entry in &schedule.accepted {
        match apply(ctx, entry) {
            Ok(Applied::Scheduled) => outcome.record_success(),
            Ok(Applied::Skipped) => outcome.record_skip(),
            Err(err) => {
                error!(task = %entry.task_id, error = %err, "failed to apply schedule entry");
                outcome.record_failure();
            }
        }
    }

    info!(%outcome, "schedule applied");
    outcome
}

/// Unscheduled `PENDING` / `SCHEDULED` tasks whose dependencies are met.
fn select_candidates(ctx: &EngineContext) -> Result<Vec<Task>> {
    let unscheduled = ctx
        .store
        .find_by_status_in(&[TaskStatus::Pending, TaskStatus::Scheduled])
        .map_err(TaskmasterError::persistence)?
        .into_iter()
        .filter(|task| task.scheduled_at.is_none());

    let mut ready = Vec::new();
    for task in unscheduled {
        if dag::dependencies_met(ctx.store.as_ref(), &task) {
            ready.push(task);
        } else {
            debug!(task = %task.id, "dependencies not met; not scheduling this run");
        }
    }
    Ok(ready)
}

/// Apply one start time against the freshest stored copy of the task.
fn apply(ctx: &EngineContext, entry: &ScheduledStart) -> Result<Applied> {
    let Some(mut task) = ctx
        .store
        .get(&entry.task_id)
        .map_err(TaskmasterError::persistence)?
    else {
        warn!(task = %entry.task_id, "task vanished before its schedule was applied");
        return Ok(Applied::Skipped);
    };

    let schedulable = match task.status {
        TaskStatus::Pending => true,
        TaskStatus::Scheduled => task.scheduled_at.is_none(),
        _ => false,
    };
    if !schedulable {
        warn!(
            task = %task.id,
            status = %task.status,
            scheduled_at = ?task.scheduled_at,
            "task already scheduled or moved on; skipping"
        );
        return Ok(Applied::Skipped);
    }

    lifecycle::assign_schedule(&mut task, entry.start_at)?;
    ctx.persist(&task)?;
    debug!(task = %task.id, start_at = %entry.start_at, "schedule applied");
    Ok(Applied::Scheduled)
}
