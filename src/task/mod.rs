// src/task/mod.rs

//! Task data model.
//!
//! - [`model`] holds the [`Task`] record, its [`Priority`] and diagnostic [`Note`]s.
//! - [`status`] holds the [`TaskStatus`] enumeration and its transition table.

pub mod model;
pub mod status;

pub use model::{Note, Priority, Task};
pub use status::TaskStatus;

/// Opaque task identifier (UUID v4 string for tasks created by this crate).
pub type TaskId = String;

/// Generate a fresh identifier for a new task.
pub fn new_task_id() -> TaskId {
    uuid::Uuid::new_v4().to_string()
}
