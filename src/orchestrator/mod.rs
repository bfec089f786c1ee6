// src/orchestrator/mod.rs

//! Drives the batch jobs on independent timers.
//!
//! Each job has its own tokio task. Every firing runs in a freshly spawned
//! task, so a panic inside a job is logged and counted but never stops the
//! timer. Shutdown is signalled through a `tokio::sync::watch` channel;
//! in-flight runs finish before the loops return.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::config::{OrchestratorConfig, SweepSchedule};
use crate::engine::{self, EngineContext, RunOutcome};

pub mod schedule;
pub mod stats;

pub use schedule::{delay_until, next_daily_run};
pub use stats::{JobStats, OrchestratorStats};

/// The three periodic jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Job {
    Reconcile,
    Initiate,
    Sweep,
}

impl Job {
    /// Order used by [`Orchestrator::run_once`].
    pub const ALL: [Job; 3] = [Job::Reconcile, Job::Initiate, Job::Sweep];

    pub const fn as_str(self) -> &'static str {
        match self {
            Job::Reconcile => "reconcile",
            Job::Initiate => "initiate",
            Job::Sweep => "sweep",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Orchestrator {
    ctx: EngineContext,
    config: OrchestratorConfig,
    stats: Arc<Mutex<OrchestratorStats>>,
}

impl Orchestrator {
    pub fn new(ctx: EngineContext, config: OrchestratorConfig) -> Self {
        Self {
            ctx,
            config,
            stats: Arc::new(Mutex::new(OrchestratorStats::default())),
        }
    }

    /// Cumulative totals since construction.
    pub fn stats(&self) -> OrchestratorStats {
        *self.lock_stats()
    }

    fn lock_stats(&self) -> MutexGuard<'_, OrchestratorStats> {
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run every job exactly once: reconcile, then initiate, then sweep.
    pub async fn run_once(&self) -> OrchestratorStats {
        for job in Job::ALL {
            self.run_job(job).await;
        }
        self.stats()
    }

    /// Run all timers until `shutdown` flips to `true` (or its sender is
    /// dropped). Returns the final totals.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> OrchestratorStats {
        info!(
            reconcile_every = ?self.config.reconcile_interval,
            initiate_every = ?self.config.initiate_interval,
            sweep = ?self.config.sweep,
            retention = ?self.config.retention,
            "orchestrator started"
        );

        let mut handles = Vec::with_capacity(Job::ALL.len());
        for job in Job::ALL {
            let this = self.clone();
            let rx = shutdown.clone();
            handles.push(tokio::spawn(async move { this.job_loop(job, rx).await }));
        }

        for handle in handles {
            if let Err(err) = handle.await {
                error!(error = %err, "timer task ended abnormally");
            }
        }

        let stats = self.stats();
        info!(?stats, "orchestrator stopped");
        stats
    }

    async fn job_loop(&self, job: Job, mut shutdown: watch::Receiver<bool>) {
        let mut first = true;
        loop {
            if *shutdown.borrow() {
                break;
            }

            let delay = self.delay_before(job, first);
            first = false;
            debug!(job = job.as_str(), ?delay, "next run scheduled");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = wait_for_shutdown(&mut shutdown) => break,
            }

            self.run_job(job).await;
        }
        debug!(job = job.as_str(), "timer stopped");
    }

    /// Reconcile and initiate fire immediately, then wait a fixed delay after
    /// each run. The sweep waits for its first slot.
    fn delay_before(&self, job: Job, first: bool) -> Duration {
        match job {
            Job::Reconcile if first => Duration::ZERO,
            Job::Reconcile => self.config.reconcile_interval,
            Job::Initiate if first => Duration::ZERO,
            Job::Initiate => self.config.initiate_interval,
            Job::Sweep => match self.config.sweep {
                SweepSchedule::Every(interval) => interval,
                SweepSchedule::DailyAt(at) => {
                    let now = self.ctx.clock.now();
                    delay_until(now, next_daily_run(now, at))
                }
            },
        }
    }

    /// Run one job in its own task and record the result.
    pub async fn run_job(&self, job: Job) -> Option<RunOutcome> {
        let started = Instant::now();
        info!(job = job.as_str(), "run started");

        let ctx = self.ctx.clone();
        let retention = self.config.retention;
        let result = tokio::spawn(async move { execute(&ctx, job, retention).await }).await;

        let outcome = match result {
            Ok(outcome) => {
                info!(job = job.as_str(), %outcome, "run summary");
                self.lock_stats().record(job, outcome);
                Some(outcome)
            }
            Err(err) => {
                error!(job = job.as_str(), error = %err, "run aborted");
                self.lock_stats().record_crash(job);
                None
            }
        };

        info!(
            job = job.as_str(),
            elapsed = ?started.elapsed(),
            "run finished"
        );
        outcome
    }
}

async fn execute(ctx: &EngineContext, job: Job, retention: Duration) -> RunOutcome {
    match job {
        Job::Reconcile => engine::reconcile(ctx, ctx.clock.now()).await,
        Job::Initiate => engine::initiate_due(ctx, ctx.clock.now()).await,
        Job::Sweep => RunOutcome {
            succeeded: engine::sweep(ctx, retention).await,
            ..RunOutcome::empty()
        },
    }
}

async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}
