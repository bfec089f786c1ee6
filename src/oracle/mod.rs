// src/oracle/mod.rs

//! The advisory oracle: task analysis, execution plans and schedules.
//!
//! The engine talks to an [`Oracle`] instead of a concrete model client, so
//! tests can script responses while production uses [`OllamaOracle`].
//! Responses are untrusted; [`validate`] checks them before use.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::errors::{Result, TaskmasterError};

pub mod ollama;
pub mod parse;
pub mod prompts;
pub mod types;
pub mod validate;

pub use ollama::OllamaOracle;
pub use types::{
    AnalysisRequest, ExecutionPlan, PlanRequest, ScheduleCandidate, ScheduleRequest,
    ScheduleSuggestion, SuggestedStart, TaskAnalysis,
};

pub type OracleFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>;

/// Trait abstracting the text-generation service.
///
/// Calls are independent; implementations keep no conversation state.
pub trait Oracle: Send + Sync {
    fn analyze(&self, request: AnalysisRequest) -> OracleFuture<'_, TaskAnalysis>;

    fn plan(&self, request: PlanRequest) -> OracleFuture<'_, ExecutionPlan>;

    fn schedule(&self, request: ScheduleRequest) -> OracleFuture<'_, ScheduleSuggestion>;
}

/// Await an oracle call with a deadline. Timeouts and transport errors both
/// become [`TaskmasterError::OracleFailure`].
pub async fn call_with_timeout<T>(
    limit: Duration,
    what: &str,
    call: OracleFuture<'_, T>,
) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(TaskmasterError::OracleFailure(format!("{what}: {err:#}"))),
        Err(_) => Err(TaskmasterError::OracleFailure(format!(
            "{what}: no response within {limit:?}"
        ))),
    }
}
