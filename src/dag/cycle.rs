// src/dag/cycle.rs

//! Dependency cycle detection for a task about to be created.
//!
//! The graph lives in the store and is fetched lazily, one lookup per
//! distinct node. Traversal uses an explicit stack so deep dependency chains
//! cannot overflow the call stack.

use std::collections::HashSet;

use tracing::debug;

use crate::errors::{Result, TaskmasterError};
use crate::store::TaskStore;
use crate::task::TaskId;

/// One node on the active DFS path, with a cursor into its dependencies.
struct Frame {
    node: TaskId,
    children: Vec<TaskId>,
    next: usize,
}

/// Check that giving `candidate` the dependency set `proposed` does not close
/// a cycle, using the store as the source of existing edges.
pub fn validate_dependencies(
    store: &dyn TaskStore,
    candidate: &str,
    proposed: &[TaskId],
) -> Result<()> {
    validate_with(candidate, proposed, |id| {
        store
            .get(id)
            .map(|task| task.map(|t| t.depends_on.into_iter().collect()))
            .map_err(TaskmasterError::persistence)
    })
}

/// Core check over an arbitrary edge source.
///
/// `fetch(id)` returns the dependency ids of `id`, or `None` for an unknown
/// node (treated as a leaf). A cycle is reported when traversal from any
/// proposed dependency reaches `candidate` itself, or revisits a node already
/// on the current path.
pub fn validate_with<F>(candidate: &str, proposed: &[TaskId], mut fetch: F) -> Result<()>
where
    F: FnMut(&str) -> Result<Option<Vec<TaskId>>>,
{
    let mut visited: HashSet<TaskId> = HashSet::new();

    for root in proposed {
        if root == candidate {
            return Err(cycle(candidate, root));
        }
        if visited.contains(root) {
            continue;
        }

        let mut on_path: HashSet<TaskId> = HashSet::new();
        let mut stack: Vec<Frame> = Vec::new();

        visited.insert(root.clone());
        on_path.insert(root.clone());
        stack.push(Frame {
            node: root.clone(),
            children: fetch(root)?.unwrap_or_default(),
            next: 0,
        });

        while let Some(frame) = stack.last_mut() {
            if frame.next >= frame.children.len() {
                on_path.remove(&frame.node);
                stack.pop();
                continue;
            }

            let child = frame.children[frame.next].clone();
            frame.next += 1;

            if child == candidate || on_path.contains(&child) {
                debug!(task = %candidate, dependency = %root, via = %child, "dependency cycle found");
                return Err(cycle(candidate, root));
            }
            if !visited.insert(child.clone()) {
                continue;
            }

            let children = fetch(&child)?.unwrap_or_default();
            on_path.insert(child.clone());
            stack.push(Frame {
                node: child,
                children,
                next: 0,
            });
        }
    }

    Ok(())
}

fn cycle(candidate: &str, dependency: &str) -> TaskmasterError {
    TaskmasterError::CycleDetected {
        task: candidate.to_string(),
        dependency: dependency.to_string(),
    }
}
