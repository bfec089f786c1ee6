// tests/lifecycle_transitions.rs

use std::error::Error;

use chrono::TimeDelta;
use taskmaster::errors::TaskmasterError;
use taskmaster::lifecycle::{self, Enrichment};
use taskmaster::task::{Priority, TaskStatus};
use taskmaster_test_utils::{t0, TaskBuilder};

type TestResult = Result<(), Box<dyn Error>>;

fn enrichment() -> Enrichment {
    Enrichment {
        priority: Priority::High,
        estimated_duration_minutes: 30,
        suggested_subtasks: vec!["outline".to_string()],
    }
}

#[test]
fn pending_becomes_scheduled_after_enrichment_without_start_time() -> TestResult {
    let mut task = TaskBuilder::new("t1").build();
    assert_eq!(task.status, TaskStatus::Pending);

    lifecycle::mark_enriched(&mut task, enrichment())?;

    assert_eq!(task.status, TaskStatus::Scheduled);
    assert_eq!(task.priority, Some(Priority::High));
    assert_eq!(task.estimated_duration_minutes, Some(30));
    assert_eq!(task.suggested_subtasks, vec!["outline".to_string()]);
    assert!(task.scheduled_at.is_none());
    assert!(lifecycle::invariants_hold(&task));
    Ok(())
}

#[test]
fn enrichment_only_applies_to_pending_tasks() {
    let mut task = TaskBuilder::new("t1").status(TaskStatus::Scheduled).build();
    let before = task.clone();

    let err = lifecycle::mark_enriched(&mut task, enrichment()).unwrap_err();

    assert!(matches!(err, TaskmasterError::InvalidState { .. }));
    assert_eq!(task, before);
}

#[test]
fn assign_schedule_sets_start_time_once() -> TestResult {
    let start = t0() + TimeDelta::hours(2);
    let mut task = TaskBuilder::new("t1").status(TaskStatus::Scheduled).build();

    lifecycle::assign_schedule(&mut task, start)?;
    assert_eq!(task.scheduled_at, Some(start));

    let before = task.clone();
    let err = lifecycle::assign_schedule(&mut task, start + TimeDelta::hours(1)).unwrap_err();
    assert!(matches!(err, TaskmasterError::InvalidState { .. }));
    assert_eq!(task, before, "existing schedule must not move");
    Ok(())
}

#[test]
fn start_requires_an_execution_plan() -> TestResult {
    let mut without_plan = TaskBuilder::new("t1").status(TaskStatus::Scheduled).build();
    let err = lifecycle::start(&mut without_plan, t0()).unwrap_err();
    assert!(matches!(err, TaskmasterError::Validation(_)));
    assert_eq!(without_plan.status, TaskStatus::Scheduled);

    let mut with_plan = TaskBuilder::new("t2")
        .status(TaskStatus::Scheduled)
        .step("do it")
        .build();
    lifecycle::start(&mut with_plan, t0())?;
    assert_eq!(with_plan.status, TaskStatus::InProgress);
    assert_eq!(with_plan.started_at, Some(t0()));
    Ok(())
}

#[test]
fn start_is_rejected_outside_scheduled() {
    for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed] {
        let mut task = TaskBuilder::new("t").status(status).step("x").build();
        let err = lifecycle::start(&mut task, t0()).unwrap_err();
        match err {
            TaskmasterError::InvalidState { from, to, .. } => {
                assert_eq!(from, status);
                assert_eq!(to, TaskStatus::InProgress);
            }
            other => panic!("Expected InvalidState, got: {:?}", other),
        }
    }
}

#[test]
fn completing_twice_fails_the_second_time() -> TestResult {
    let mut task = TaskBuilder::new("t1").status(TaskStatus::InProgress).build();
    let done_at = t0() + TimeDelta::minutes(5);

    lifecycle::complete(&mut task, done_at)?;
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.completed_at, Some(done_at));

    let before = task.clone();
    let err = lifecycle::complete(&mut task, done_at + TimeDelta::minutes(1)).unwrap_err();
    match err {
        TaskmasterError::InvalidState { from, to, .. } => {
            assert_eq!(from, TaskStatus::Completed);
            assert_eq!(to, TaskStatus::Completed);
        }
        other => panic!("Expected InvalidState, got: {:?}", other),
    }
    assert_eq!(task, before);
    Ok(())
}

#[test]
fn fail_appends_reason_and_sets_completion_time() -> TestResult {
    let mut task = TaskBuilder::new("t1").status(TaskStatus::Scheduled).build();

    lifecycle::fail(&mut task, t0(), Some("  disk full  "))?;

    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.completed_at, Some(t0()));
    assert_eq!(task.notes.len(), 1);
    assert_eq!(task.notes[0].message, "disk full");
    Ok(())
}

#[test]
fn fail_without_reason_adds_no_note() -> TestResult {
    let mut task = TaskBuilder::new("t1").status(TaskStatus::Pending).build();
    lifecycle::fail(&mut task, t0(), Some("   "))?;
    assert!(task.notes.is_empty());
    Ok(())
}

#[test]
fn terminal_tasks_reject_every_transition() {
    for status in TaskStatus::TERMINAL {
        let mut task = TaskBuilder::new("t").status(status).build();
        let before = task.clone();

        assert!(lifecycle::fail(&mut task, t0(), Some("again")).is_err());
        assert!(lifecycle::cancel(&mut task, t0()).is_err());
        assert!(lifecycle::complete(&mut task, t0()).is_err());
        assert!(lifecycle::assign_schedule(&mut task, t0()).is_err());
        assert_eq!(task, before, "{status} task must be left unchanged");
    }
}

#[test]
fn cancel_from_every_non_terminal_status() -> TestResult {
    for status in [TaskStatus::Pending, TaskStatus::Scheduled, TaskStatus::InProgress] {
        let mut task = TaskBuilder::new("t").status(status).build();
        lifecycle::cancel(&mut task, t0())?;
        assert_eq!(task.status, TaskStatus::Cancelled);
        assert!(lifecycle::invariants_hold(&task));
    }
    Ok(())
}
