// src/oracle/validate.rs

//! Turn raw oracle suggestions into values the lifecycle accepts.
//!
//! Errors here are plain strings; callers decide whether a bad suggestion is
//! an [`OracleFailure`](crate::errors::TaskmasterError::OracleFailure) for the
//! whole operation or just one failed item in a batch.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::lifecycle::Enrichment;
use crate::task::{Priority, TaskId};

use super::types::{ExecutionPlan, ScheduleSuggestion, TaskAnalysis};

/// Naive formats accepted for start times without an offset; read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Require a recognised priority and a positive duration. Missing subtasks
/// default to empty; blank subtasks are dropped.
pub fn validate_analysis(analysis: TaskAnalysis) -> Result<Enrichment, String> {
    let priority: Priority = analysis
        .priority
        .as_deref()
        .ok_or_else(|| "analysis has no priority".to_string())?
        .parse()?;

    let minutes = analysis
        .estimated_duration_minutes
        .as_ref()
        .and_then(duration_minutes)
        .ok_or_else(|| "analysis has no usable estimatedDurationMinutes".to_string())?;
    if minutes == 0 {
        return Err("estimatedDurationMinutes must be positive".to_string());
    }

    Ok(Enrichment {
        priority,
        estimated_duration_minutes: minutes,
        suggested_subtasks: non_blank(analysis.suggested_subtasks.unwrap_or_default()),
    })
}

fn duration_minutes(value: &serde_json::Value) -> Option<u32> {
    let raw = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() || raw < 0.0 || raw > f64::from(u32::MAX) {
        return None;
    }
    Some(raw.round() as u32)
}

/// A plan must contain at least one non-blank step.
pub fn validate_plan(plan: ExecutionPlan) -> Result<Vec<String>, String> {
    let steps = non_blank(plan.execution_steps.unwrap_or_default());
    if steps.is_empty() {
        Err("execution plan has no steps".to_string())
    } else {
        Ok(steps)
    }
}

fn non_blank(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// A schedule entry that can be applied to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledStart {
    pub task_id: TaskId,
    pub start_at: DateTime<Utc>,
}

/// A schedule entry that was thrown away, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub task_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedSchedule {
    pub accepted: Vec<ScheduledStart>,
    pub rejected: Vec<RejectedEntry>,
}

/// Split the oracle's schedule into usable entries and rejects.
///
/// An entry is rejected if its id or start time is missing, the start time
/// does not parse, or the id was not among the tasks offered (`offered`).
pub fn validate_schedule(
    suggestion: ScheduleSuggestion,
    offered: &HashSet<TaskId>,
) -> ValidatedSchedule {
    let mut out = ValidatedSchedule::default();

    for entry in suggestion.scheduled_tasks.unwrap_or_default() {
        let id = entry
            .task_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        let time = entry
            .suggested_start_time
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let (id, time) = match (id, time) {
            (Some(id), Some(time)) => (id, time),
            (id, _) => {
                out.rejected.push(RejectedEntry {
                    task_id: id,
                    reason: "entry is missing taskId or suggestedStartTime".to_string(),
                });
                continue;
            }
        };

        if !offered.contains(&id) {
            out.rejected.push(RejectedEntry {
                reason: format!("task {id} was not offered for scheduling"),
                task_id: Some(id),
            });
            continue;
        }

        match parse_start_time(&time) {
            Some(start_at) => out.accepted.push(ScheduledStart {
                task_id: id,
                start_at,
            }),
            None => out.rejected.push(RejectedEntry {
                reason: format!("unparseable start time {time:?}"),
                task_id: Some(id),
            }),
        }
    }

    out
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS]` timestamp taken as UTC.
pub fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}
