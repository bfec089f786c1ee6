// tests/schedule_reconciler.rs

use std::error::Error;

use chrono::{TimeDelta, TimeZone, Utc};
use taskmaster::engine::{reconcile, RunOutcome};
use taskmaster::store::TaskStore;
use taskmaster::task::TaskStatus;
use taskmaster_test_utils::scripted_oracle::schedule;
use taskmaster_test_utils::{init_tracing, t0, FlakyStore, Harness, Reply, TaskBuilder};

type TestResult = Result<(), Box<dyn Error>>;

fn unscheduled(id: &str) -> taskmaster::task::Task {
    TaskBuilder::new(id).status(TaskStatus::Scheduled).build()
}

#[tokio::test]
async fn zero_candidates_means_zero_oracle_calls() {
    init_tracing();
    let h = Harness::with_tasks([
        TaskBuilder::new("a").status(TaskStatus::Scheduled).scheduled_at(t0()).build(),
        TaskBuilder::new("b").status(TaskStatus::Completed).build(),
    ]);

    let outcome = reconcile(&h.ctx, t0()).await;

    assert_eq!(outcome, RunOutcome::empty());
    assert_eq!(h.oracle.schedule_calls(), 0);
}

#[tokio::test]
async fn blocked_tasks_are_not_offered() {
    let h = Harness::with_tasks([
        TaskBuilder::new("dep").status(TaskStatus::InProgress).build(),
        TaskBuilder::new("blocked")
            .status(TaskStatus::Scheduled)
            .depends_on("dep")
            .build(),
    ]);

    let outcome = reconcile(&h.ctx, t0()).await;

    assert!(outcome.is_empty());
    assert_eq!(h.oracle.schedule_calls(), 0);
    assert!(h.task("blocked").scheduled_at.is_none());
}

#[tokio::test]
async fn applies_suggested_start_times() -> TestResult {
    let h = Harness::with_tasks([
        unscheduled("a"),
        unscheduled("b"),
        TaskBuilder::new("done").status(TaskStatus::Completed).build(),
        TaskBuilder::new("c")
            .status(TaskStatus::Scheduled)
            .depends_on("done")
            .build(),
    ]);
    h.oracle.push_schedule(Reply::Ok(schedule(&[
        (Some("a"), Some("2025-01-01T09:00:00Z")),
        (Some("b"), Some("2025-01-01T09:30")),
        (Some("c"), Some("2025-01-01T11:00:00+01:00")),
    ])));

    let outcome = reconcile(&h.ctx, t0()).await;

    assert_eq!(outcome.succeeded, 3);
    assert_eq!(outcome.failed, 0);
    assert_eq!(
        h.task("a").scheduled_at,
        Some(Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap())
    );
    assert_eq!(
        h.task("b").scheduled_at,
        Some(Utc.with_ymd_and_hms(2025, 1, 1, 9, 30, 0).unwrap())
    );
    assert_eq!(
        h.task("c").scheduled_at,
        Some(Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap())
    );

    let requests = h.oracle.schedule_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].reference_time, t0());
    let offered: Vec<&str> = requests[0].tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(offered, vec!["a", "b", "c"]);
    assert_eq!(requests[0].tasks[2].depends_on, vec!["done".to_string()]);
    Ok(())
}

#[tokio::test]
async fn unknown_and_incomplete_entries_are_counted_as_failed() {
    init_tracing();
    let h = Harness::with_tasks([unscheduled("a")]);
    h.oracle.push_schedule(Reply::Ok(schedule(&[
        (Some("ghost"), Some("2025-01-01T09:00:00Z")),
        (None, Some("2025-01-01T09:00:00Z")),
        (Some("a"), None),
        (Some("a"), Some("tomorrow-ish")),
    ])));

    let outcome = reconcile(&h.ctx, t0()).await;

    assert_eq!(
        outcome,
        RunOutcome {
            succeeded: 0,
            skipped: 0,
            failed: 4
        }
    );
    assert!(h.task("a").scheduled_at.is_none());
}

#[tokio::test]
async fn duplicate_entries_apply_once_and_skip_the_rest() {
    let h = Harness::with_tasks([unscheduled("a")]);
    h.oracle.push_schedule(Reply::Ok(schedule(&[
        (Some("a"), Some("2025-01-01T09:00:00Z")),
        (Some("a"), Some("2025-01-01T12:00:00Z")),
    ])));

    let outcome = reconcile(&h.ctx, t0()).await;

    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(
        h.task("a").scheduled_at,
        Some(Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn oracle_failure_counts_every_candidate_and_changes_nothing() {
    let h = Harness::with_tasks([unscheduled("a"), unscheduled("b")]);
    h.oracle.push_schedule(Reply::Err("model offline".to_string()));

    let outcome = reconcile(&h.ctx, t0()).await;

    assert_eq!(outcome.failed, 2);
    assert!(h.task("a").scheduled_at.is_none());
    assert!(h.task("b").scheduled_at.is_none());

    // The next run simply tries again.
    let retry = reconcile(&h.ctx, t0() + TimeDelta::hours(1)).await;
    assert_eq!(retry.succeeded, 2);
}

#[tokio::test]
async fn one_failed_write_does_not_block_the_others() -> TestResult {
    let h = Harness::with_store(FlakyStore::with_tasks([unscheduled("a"), unscheduled("b")]));
    h.store.fail_next_saves(1);

    let outcome = reconcile(&h.ctx, t0()).await;

    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.succeeded, 1);
    let scheduled = h
        .store
        .find_all()?
        .into_iter()
        .filter(|t| t.scheduled_at.is_some())
        .count();
    assert_eq!(scheduled, 1);
    Ok(())
}

#[tokio::test]
async fn unreadable_store_is_a_counted_failure() {
    let h = Harness::with_store(FlakyStore::with_tasks([unscheduled("a")]));
    h.store.set_fail_reads(true);

    let outcome = reconcile(&h.ctx, t0()).await;

    assert_eq!(outcome.failed, 1);
    assert_eq!(h.oracle.schedule_calls(), 0);
}
