// src/engine/mod.rs

//! Batch jobs that move tasks through their lifecycle.
//!
//! - [`reconciler`] asks the oracle for start times for unscheduled tasks.
//! - [`initiator`] starts tasks whose start time has arrived.
//! - [`sweeper`] deletes tasks that have been terminal for too long.
//!
//! Each job is a plain async function over an [`EngineContext`]; timers live
//! in [`crate::orchestrator`]. Jobs never return item-level errors: they log
//! them and count them in a [`RunOutcome`].

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::clock::Clock;
use crate::errors::{Result, TaskmasterError};
use crate::oracle::{self, validate, Oracle, PlanRequest};
use crate::store::TaskStore;
use crate::task::Task;

pub mod initiator;
pub mod outcome;
pub mod reconciler;
pub mod sweeper;

pub use initiator::{initiate, initiate_due, InitiationOutcome};
pub use outcome::RunOutcome;
pub use reconciler::reconcile;
pub use sweeper::sweep;

/// Default bound on a single oracle call.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared handles every job and the task service work against.
#[derive(Clone)]
pub struct EngineContext {
    pub store: Arc<dyn TaskStore>,
    pub oracle: Arc<dyn Oracle>,
    pub clock: Arc<dyn Clock>,
    pub oracle_timeout: Duration,
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("clock", &self.clock)
            .field("oracle_timeout", &self.oracle_timeout)
            .finish_non_exhaustive()
    }
}

impl EngineContext {
    pub fn new(store: Arc<dyn TaskStore>, oracle: Arc<dyn Oracle>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            oracle,
            clock,
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Fetch a task, mapping absence to [`TaskmasterError::NotFound`].
    pub(crate) fn load(&self, id: &str) -> Result<Task> {
        self.store
            .get(id)
            .map_err(TaskmasterError::persistence)?
            .ok_or_else(|| TaskmasterError::NotFound(id.to_string()))
    }

    pub(crate) fn persist(&self, task: &Task) -> Result<()> {
        self.store.save(task).map_err(TaskmasterError::persistence)
    }

    /// Ask the oracle for an execution plan for `task`. An empty plan is an
    /// [`TaskmasterError::OracleFailure`].
    pub(crate) async fn request_plan(&self, task: &Task) -> Result<Vec<String>> {
        let plan = oracle::call_with_timeout(
            self.oracle_timeout,
            "execution plan",
            self.oracle.plan(PlanRequest::for_task(task)),
        )
        .await?;
        let steps = validate::validate_plan(plan).map_err(TaskmasterError::OracleFailure)?;
        debug!(task = %task.id, steps = steps.len(), "execution plan generated");
        Ok(steps)
    }
}
