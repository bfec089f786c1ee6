// src/errors.rs

//! Crate-wide error type.
//!
//! Single-task operations surface the specific variant to their caller.
//! Batch jobs never return these to the orchestrator; they count them.

use thiserror::Error;

use crate::task::{TaskId, TaskStatus};

#[derive(Error, Debug)]
pub enum TaskmasterError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Circular dependency: task {task} cannot depend on task {dependency}")]
    CycleDetected { task: TaskId, dependency: TaskId },

    #[error("Invalid task state: task {task} cannot move from {from} to {to}")]
    InvalidState {
        task: TaskId,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("Oracle failure: {0}")]
    OracleFailure(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskmasterError {
    /// Wrap a store error. The full `anyhow` chain is kept in the message.
    pub fn persistence(err: anyhow::Error) -> Self {
        TaskmasterError::PersistenceFailure(format!("{err:#}"))
    }

    pub fn oracle(err: anyhow::Error) -> Self {
        TaskmasterError::OracleFailure(format!("{err:#}"))
    }

    /// Errors caused by the caller's input rather than by a collaborator.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            TaskmasterError::NotFound(_)
                | TaskmasterError::CycleDetected { .. }
                | TaskmasterError::InvalidState { .. }
                | TaskmasterError::Validation(_)
        )
    }

    /// Oracle failures only fail the current run; the next run may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskmasterError::OracleFailure(_))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskmasterError>;
