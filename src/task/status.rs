// src/task/status.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a task.
///
/// ```text
/// PENDING -> SCHEDULED -> IN_PROGRESS -> COMPLETED
///    |           |             |
///    +-----------+-------------+--> FAILED | CANCELLED
/// ```
///
/// `COMPLETED`, `FAILED` and `CANCELLED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
    Failed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Pending,
        TaskStatus::Scheduled,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
        TaskStatus::Failed,
    ];

    pub const TERMINAL: [TaskStatus; 3] = [
        TaskStatus::Completed,
        TaskStatus::Failed,
        TaskStatus::Cancelled,
    ];

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    /// Statuses reachable from `self` in one transition.
    ///
    /// `SCHEDULED -> SCHEDULED` is the reconciler assigning a start time.
    /// Preconditions beyond the status itself (dependency gate, missing
    /// `scheduled_at`) are checked in [`crate::lifecycle`].
    pub const fn allowed_next_states(self) -> &'static [TaskStatus] {
        match self {
            TaskStatus::Pending => &[
                TaskStatus::Scheduled,
                TaskStatus::Failed,
                TaskStatus::Cancelled,
            ],
            TaskStatus::Scheduled => &[
                TaskStatus::Scheduled,
                TaskStatus::InProgress,
                TaskStatus::Failed,
                TaskStatus::Cancelled,
            ],
            TaskStatus::InProgress => &[
                TaskStatus::Completed,
                TaskStatus::Failed,
                TaskStatus::Cancelled,
            ],
            TaskStatus::Completed | TaskStatus::Cancelled | TaskStatus::Failed => &[],
        }
    }

    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        self.allowed_next_states().contains(&next)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Scheduled => "SCHEDULED",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
            TaskStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_uppercase().replace('-', "_");
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalised)
            .ok_or_else(|| {
                format!(
                    "invalid task status: {s} (expected one of PENDING, SCHEDULED, IN_PROGRESS, COMPLETED, CANCELLED, FAILED)"
                )
            })
    }
}
