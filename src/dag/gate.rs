// src/dag/gate.rs

//! The dependency gate: may a task start, given its prerequisites?

use tracing::{debug, error, warn};

use crate::store::TaskStore;
use crate::task::{Task, TaskId, TaskStatus};

/// Why the gate is open or closed for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Every dependency is `COMPLETED` (or there are none).
    Met,
    /// Some dependencies exist but are not `COMPLETED` yet.
    Waiting(Vec<(TaskId, TaskStatus)>),
    /// Some dependency ids do not resolve to a stored task.
    Missing(Vec<TaskId>),
    /// The store could not be read; the gate stays closed.
    Unavailable(String),
}

impl GateDecision {
    pub fn is_met(&self) -> bool {
        matches!(self, GateDecision::Met)
    }
}

/// Evaluate the gate against the store's current view of the dependencies.
///
/// Fails closed: a missing dependency or a store error never counts as
/// satisfied.
pub fn evaluate(store: &dyn TaskStore, task: &Task) -> GateDecision {
    if !task.has_dependencies() {
        return GateDecision::Met;
    }

    let ids: Vec<TaskId> = task.depends_on.iter().cloned().collect();
    let found = match store.find_all_by_id(&ids) {
        Ok(found) => found,
        Err(err) => {
            let reason = format!("{err:#}");
            error!(task = %task.id, error = %reason, "could not load dependencies; treating as unmet");
            return GateDecision::Unavailable(reason);
        }
    };

    if found.len() != ids.len() {
        let missing: Vec<TaskId> = ids
            .into_iter()
            .filter(|id| !found.iter().any(|t| &t.id == id))
            .collect();
        warn!(task = %task.id, ?missing, "dependencies missing from store; treating as unmet");
        return GateDecision::Missing(missing);
    }

    let waiting: Vec<(TaskId, TaskStatus)> = found
        .iter()
        .filter(|dep| dep.status != TaskStatus::Completed)
        .map(|dep| (dep.id.clone(), dep.status))
        .collect();

    if waiting.is_empty() {
        debug!(task = %task.id, "all dependencies met");
        GateDecision::Met
    } else {
        debug!(task = %task.id, ?waiting, "dependencies not met");
        GateDecision::Waiting(waiting)
    }
}

/// `true` only if every dependency of `task` is `COMPLETED`.
pub fn dependencies_met(store: &dyn TaskStore, task: &Task) -> bool {
    evaluate(store, task).is_met()
}
