// src/oracle/prompts.rs

//! Prompt text sent to a text-generation oracle.

use chrono::SecondsFormat;

use super::types::{AnalysisRequest, PlanRequest, ScheduleCandidate, ScheduleRequest};

const ANALYSIS_FORMAT: &str = r#"Respond with a single JSON object and nothing else:
{"priority": "LOW|MEDIUM|HIGH|CRITICAL", "estimatedDurationMinutes": <integer>, "suggestedSubtasks": ["..."]}"#;

const PLAN_FORMAT: &str = r#"Respond with a single JSON object and nothing else:
{"executionSteps": ["step 1", "step 2"]}"#;

const SCHEDULE_FORMAT: &str = r#"Respond with a single JSON object and nothing else:
{"scheduledTasks": [{"taskId": "<id from the list>", "suggestedStartTime": "YYYY-MM-DDTHH:MM:SSZ"}]}"#;

pub fn analysis_prompt(request: &AnalysisRequest) -> String {
    format!(
        "Analyze the task below.\n\
         Task title: \"{title}\"\n\
         Task description: \"{description}\"\n\
         \n\
         Decide:\n\
         1. priority: one of LOW, MEDIUM, HIGH, CRITICAL, weighing urgency and importance.\n\
         2. estimatedDurationMinutes: a whole number of minutes.\n\
         3. suggestedSubtasks: the key subtasks as short strings, or [] if none are obvious.\n\
         \n\
         {ANALYSIS_FORMAT}\n",
        title = request.title,
        description = request.description,
    )
}

pub fn plan_prompt(request: &PlanRequest) -> String {
    let priority = request
        .priority
        .map(|p| p.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let subtasks = if request.subtasks.is_empty() {
        "None".to_string()
    } else {
        request.subtasks.join("; ")
    };

    format!(
        "Write a concise, actionable step-by-step plan for carrying out this task.\n\
         Task title: \"{title}\"\n\
         Task description: \"{description}\"\n\
         Priority: {priority}\n\
         Suggested subtasks (context only): {subtasks}\n\
         \n\
         Simple tasks may need only one or two steps; break complex ones down logically.\n\
         \n\
         {PLAN_FORMAT}\n",
        title = request.title,
        description = request.description,
    )
}

pub fn schedule_prompt(request: &ScheduleRequest) -> String {
    let reference = request
        .reference_time
        .to_rfc3339_opts(SecondsFormat::Secs, true);
    let task_list = if request.tasks.is_empty() {
        "No tasks ready to schedule.".to_string()
    } else {
        request
            .tasks
            .iter()
            .map(format_candidate)
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    format!(
        "Schedule the tasks below back-to-back, starting at the reference time.\n\
         Higher priority first (CRITICAL > HIGH > MEDIUM > LOW). A task may not start before \
         the tasks it depends on have finished; use the estimated durations.\n\
         \n\
         Reference start time: {reference}\n\
         \n\
         Tasks:\n\
         {task_list}\n\
         \n\
         Give one suggestedStartTime per task id listed above and no other ids.\n\
         \n\
         {SCHEDULE_FORMAT}\n"
    )
}

fn format_candidate(task: &ScheduleCandidate) -> String {
    let priority = task
        .priority
        .map(|p| p.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let duration = task
        .duration_minutes
        .map(|m| m.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let depends_on = if task.depends_on.is_empty() {
        "None".to_string()
    } else {
        task.depends_on.join(", ")
    };

    format!(
        "- Task ID: {}\n  Title: {}\n  Priority: {}\n  Estimated Duration (minutes): {}\n  Depends On: {}",
        task.id, task.title, priority, duration, depends_on
    )
}
