// src/oracle/types.rs

//! Request and raw response shapes exchanged with the oracle.
//!
//! Every response field is optional: the oracle's output is a suggestion and
//! is checked in [`super::validate`] before anything reaches a [`Task`].
//!
//! [`Task`]: crate::task::Task

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Priority, Task, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    pub title: String,
    pub description: String,
}

/// Raw analysis: `{"priority", "estimatedDurationMinutes", "suggestedSubtasks"}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskAnalysis {
    pub priority: Option<String>,
    /// Accepts a number or a numeric string.
    pub estimated_duration_minutes: Option<serde_json::Value>,
    pub suggested_subtasks: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanRequest {
    pub task_id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub subtasks: Vec<String>,
}

impl PlanRequest {
    pub fn for_task(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            subtasks: task.suggested_subtasks.clone(),
        }
    }
}

/// Raw plan: `{"executionSteps": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionPlan {
    pub execution_steps: Option<Vec<String>>,
}

/// One task offered to the oracle for scheduling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleCandidate {
    pub id: TaskId,
    pub title: String,
    pub priority: Option<Priority>,
    pub duration_minutes: Option<u32>,
    pub depends_on: Vec<TaskId>,
}

impl ScheduleCandidate {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            priority: task.priority,
            duration_minutes: task.estimated_duration_minutes,
            depends_on: task.depends_on.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRequest {
    pub reference_time: DateTime<Utc>,
    pub tasks: Vec<ScheduleCandidate>,
}

/// Raw schedule: `{"scheduledTasks": [{"taskId", "suggestedStartTime"}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleSuggestion {
    pub scheduled_tasks: Option<Vec<SuggestedStart>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestedStart {
    #[serde(alias = "id")]
    pub task_id: Option<String>,
    #[serde(alias = "startTime")]
    pub suggested_start_time: Option<String>,
}
