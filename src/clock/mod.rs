// src/clock/mod.rs

use std::fmt::Debug;

use chrono::{DateTime, Utc};

pub mod manual;

pub use manual::ManualClock;

/// Source of "now" for timestamps and due/retention cut-offs.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
