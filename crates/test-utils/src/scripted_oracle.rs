use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::anyhow;
use taskmaster::oracle::{
    AnalysisRequest, ExecutionPlan, Oracle, OracleFuture, PlanRequest, ScheduleRequest,
    ScheduleSuggestion, SuggestedStart, TaskAnalysis,
};

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    /// Answers `Ok` after the given delay, leaving room for interleaved work.
    Delayed(std::time::Duration, T),
    Err(String),
    /// Never answers; exercises caller timeouts.
    Hang,
}

/// A fake oracle that:
/// - answers from per-call queues, falling back to a sane default
/// - counts calls and records every schedule request.
///
/// Defaults: analysis `HIGH` / 30 minutes / no subtasks; a two-step plan;
/// a schedule that starts every offered task at the reference time.
#[derive(Default)]
pub struct ScriptedOracle {
    analyses: Mutex<VecDeque<Reply<TaskAnalysis>>>,
    plans: Mutex<VecDeque<Reply<ExecutionPlan>>>,
    schedules: Mutex<VecDeque<Reply<ScheduleSuggestion>>>,
    schedule_requests: Mutex<Vec<ScheduleRequest>>,
    analyze_calls: AtomicUsize,
    plan_calls: AtomicUsize,
    schedule_calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_analysis(&self, reply: Reply<TaskAnalysis>) -> &Self {
        self.analyses.lock().unwrap().push_back(reply);
        self
    }

    pub fn push_plan(&self, reply: Reply<ExecutionPlan>) -> &Self {
        self.plans.lock().unwrap().push_back(reply);
        self
    }

    pub fn push_schedule(&self, reply: Reply<ScheduleSuggestion>) -> &Self {
        self.schedules.lock().unwrap().push_back(reply);
        self
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    pub fn plan_calls(&self) -> usize {
        self.plan_calls.load(Ordering::SeqCst)
    }

    pub fn schedule_calls(&self) -> usize {
        self.schedule_calls.load(Ordering::SeqCst)
    }

    pub fn schedule_requests(&self) -> Vec<ScheduleRequest> {
        self.schedule_requests.lock().unwrap().clone()
    }
}

/// An analysis response as the model would send it.
pub fn analysis(priority: &str, minutes: i64, subtasks: &[&str]) -> TaskAnalysis {
    TaskAnalysis {
        priority: Some(priority.to_string()),
        estimated_duration_minutes: Some(serde_json::Value::from(minutes)),
        suggested_subtasks: Some(subtasks.iter().map(|s| s.to_string()).collect()),
    }
}

pub fn plan(steps: &[&str]) -> ExecutionPlan {
    ExecutionPlan {
        execution_steps: Some(steps.iter().map(|s| s.to_string()).collect()),
    }
}

/// A schedule with `(task_id, start_time)` entries, either side optional.
pub fn schedule(entries: &[(Option<&str>, Option<&str>)]) -> ScheduleSuggestion {
    ScheduleSuggestion {
        scheduled_tasks: Some(
            entries
                .iter()
                .map(|(id, at)| SuggestedStart {
                    task_id: id.map(str::to_string),
                    suggested_start_time: at.map(str::to_string),
                })
                .collect(),
        ),
    }
}

fn next<T>(queue: &Mutex<VecDeque<Reply<T>>>) -> Option<Reply<T>> {
    queue.lock().unwrap().pop_front()
}

async fn answer<T>(reply: Reply<T>) -> anyhow::Result<T> {
    match reply {
        Reply::Ok(value) => Ok(value),
        Reply::Delayed(delay, value) => {
            tokio::time::sleep(delay).await;
            Ok(value)
        }
        Reply::Err(msg) => Err(anyhow!(msg)),
        Reply::Hang => std::future::pending().await,
    }
}

impl Oracle for ScriptedOracle {
    fn analyze(&self, _request: AnalysisRequest) -> OracleFuture<'_, TaskAnalysis> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        let reply = next(&self.analyses).unwrap_or_else(|| Reply::Ok(analysis("HIGH", 30, &[])));
        Box::pin(answer(reply))
    }

    fn plan(&self, _request: PlanRequest) -> OracleFuture<'_, ExecutionPlan> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        let reply = next(&self.plans).unwrap_or_else(|| Reply::Ok(plan(&["prepare", "do it"])));
        Box::pin(answer(reply))
    }

    fn schedule(&self, request: ScheduleRequest) -> OracleFuture<'_, ScheduleSuggestion> {
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);
        let reply = next(&self.schedules).unwrap_or_else(|| {
            let at = request.reference_time.to_rfc3339();
            Reply::Ok(ScheduleSuggestion {
                scheduled_tasks: Some(
                    request
                        .tasks
                        .iter()
                        .map(|t| SuggestedStart {
                            task_id: Some(t.id.clone()),
                            suggested_start_time: Some(at.clone()),
                        })
                        .collect(),
                ),
            })
        });
        self.schedule_requests.lock().unwrap().push(request);
        Box::pin(answer(reply))
    }
}
