// src/task/model.rs

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TaskId, TaskStatus};

/// Advisory priority assigned by the oracle at creation time.
///
/// Ordered `LOW < MEDIUM < HIGH < CRITICAL`. Only passed back to the oracle as
/// a scheduling hint; nothing in this crate orders work by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            "CRITICAL" => Ok(Priority::Critical),
            other => Err(format!(
                "invalid priority: {other} (expected LOW, MEDIUM, HIGH or CRITICAL)"
            )),
        }
    }
}

/// One entry in a task's append-only diagnostic log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// The unit of work tracked through the lifecycle.
///
/// Fields are public for reading and for stores/serialization; status and
/// timestamp changes must go through [`crate::lifecycle`] so that the
/// `completed_at` / `scheduled_at` invariants hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    pub status: TaskStatus,

    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub estimated_duration_minutes: Option<u32>,
    #[serde(default)]
    pub suggested_subtasks: Vec<String>,
    #[serde(default)]
    pub execution_steps: Vec<String>,

    /// Tasks that must be `COMPLETED` before this one may start.
    #[serde(default)]
    pub depends_on: BTreeSet<TaskId>,

    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Task {
    /// A freshly created, not yet enriched task in `PENDING`.
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        depends_on: BTreeSet<TaskId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            priority: None,
            status: TaskStatus::Pending,
            created_at: now,
            scheduled_at: None,
            started_at: None,
            completed_at: None,
            estimated_duration_minutes: None,
            suggested_subtasks: Vec::new(),
            execution_steps: Vec::new(),
            depends_on,
            notes: Vec::new(),
        }
    }

    pub fn has_dependencies(&self) -> bool {
        !self.depends_on.is_empty()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn has_execution_plan(&self) -> bool {
        !self.execution_steps.is_empty()
    }

    /// Notes are only ever appended.
    pub(crate) fn append_note(&mut self, at: DateTime<Utc>, message: impl Into<String>) {
        self.notes.push(Note {
            at,
            message: message.into(),
        });
    }
}
