// src/engine/outcome.rs

use std::fmt;
use std::ops::AddAssign;

use serde::Serialize;

/// Per-run counts reported by a batch job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    pub succeeded: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl RunOutcome {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> u64 {
        self.succeeded + self.skipped + self.failed
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }
}

impl AddAssign for RunOutcome {
    fn add_assign(&mut self, other: Self) {
        self.succeeded += other.succeeded;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "succeeded={} skipped={} failed={}",
            self.succeeded, self.skipped, self.failed
        )
    }
}
