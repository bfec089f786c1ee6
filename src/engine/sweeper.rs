// src/engine/sweeper.rs

//! Retention sweep: delete tasks that have been terminal for too long.

use std::time::Duration;

use chrono::TimeDelta;
use tracing::{debug, error, info, warn};

use crate::task::{TaskId, TaskStatus};

use super::EngineContext;

/// Delete every terminal task whose `completed_at` is strictly before
/// `now - retention`, as one batch. Returns how many were deleted; any store
/// error is logged and reported as zero.
///
/// A task that an unfinished task still depends on is kept until that
/// dependent finishes, so its gate never turns `Missing`.
pub async fn sweep(ctx: &EngineContext, retention: Duration) -> u64 {
    let now = ctx.clock.now();
    let Some(cutoff) = TimeDelta::from_std(retention)
        .ok()
        .and_then(|delta| now.checked_sub_signed(delta))
    else {
        info!(?retention, "retention period reaches before the start of time; nothing to sweep");
        return 0;
    };

    let expired = match ctx
        .store
        .find_by_status_in_completed_before(&TaskStatus::TERMINAL, cutoff)
    {
        Ok(expired) => expired,
        Err(err) => {
            let reason = format!("{err:#}");
            error!(error = %reason, "could not load expired tasks");
            return 0;
        }
    };

    if expired.is_empty() {
        info!(cutoff = %cutoff, "no expired tasks to sweep");
        return 0;
    }

    let ids: Vec<TaskId> = expired
        .into_iter()
        .map(|t| t.id)
        .filter(|id| !still_needed(ctx, id))
        .collect();
    if ids.is_empty() {
        info!(cutoff = %cutoff, "every expired task is still depended on; nothing to sweep");
        return 0;
    }

    match ctx.store.delete_all(&ids) {
        Ok(deleted) => {
            info!(deleted, cutoff = %cutoff, "expired tasks deleted");
            deleted as u64
        }
        Err(err) => {
            let reason = format!("{err:#}");
            error!(error = %reason, count = ids.len(), "failed to delete expired tasks");
            0
        }
    }
}

/// Whether a non-terminal task depends on `id`. A failed lookup counts as
/// needed.
fn still_needed(ctx: &EngineContext, id: &str) -> bool {
    match ctx.store.find_dependents(id) {
        Ok(dependents) => {
            let waiting: Vec<&str> = dependents
                .iter()
                .filter(|t| !t.is_terminal())
                .map(|t| t.id.as_str())
                .collect();
            if !waiting.is_empty() {
                debug!(task = %id, ?waiting, "keeping expired task; dependents have not finished");
            }
            !waiting.is_empty()
        }
        Err(err) => {
            let reason = format!("{err:#}");
            warn!(task = %id, error = %reason, "could not load dependents; keeping task");
            true
        }
    }
}
