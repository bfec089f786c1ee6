// src/dag/mod.rs

//! Task dependency graph.
//!
//! - [`cycle`] rejects dependency sets that would close a cycle.
//! - [`gate`] decides whether a task's prerequisites are all `COMPLETED`.

pub mod cycle;
pub mod gate;

pub use cycle::{validate_dependencies, validate_with};
pub use gate::{dependencies_met, evaluate, GateDecision};
