// src/orchestrator/stats.rs

use crate::engine::RunOutcome;

use super::Job;

/// Running totals for one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    /// Runs that returned an outcome.
    pub runs: u64,
    /// Runs that panicked.
    pub crashes: u64,
    pub totals: RunOutcome,
    pub last: Option<RunOutcome>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorStats {
    pub reconcile: JobStats,
    pub initiate: JobStats,
    pub sweep: JobStats,
}

impl OrchestratorStats {
    pub fn job(&self, job: Job) -> &JobStats {
        match job {
            Job::Reconcile => &self.reconcile,
            Job::Initiate => &self.initiate,
            Job::Sweep => &self.sweep,
        }
    }

    fn job_mut(&mut self, job: Job) -> &mut JobStats {
        match job {
            Job::Reconcile => &mut self.reconcile,
            Job::Initiate => &mut self.initiate,
            Job::Sweep => &mut self.sweep,
        }
    }

    pub(crate) fn record(&mut self, job: Job, outcome: RunOutcome) {
        let stats = self.job_mut(job);
        stats.runs += 1;
        stats.totals += outcome;
        stats.last = Some(outcome);
    }

    pub(crate) fn record_crash(&mut self, job: Job) {
        self.job_mut(job).crashes += 1;
    }
}
