// tests/task_service.rs

use std::error::Error;
use std::time::Duration;

use chrono::TimeDelta;
use taskmaster::errors::TaskmasterError;
use taskmaster::service::CreateTask;
use taskmaster::store::TaskStore;
use taskmaster::task::{Priority, TaskStatus};
use taskmaster_test_utils::scripted_oracle::{analysis, plan};
use taskmaster_test_utils::{init_tracing, t0, FlakyStore, Harness, Reply, TaskBuilder};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn create_enriches_and_leaves_task_schedulable() -> TestResult {
    init_tracing();
    let h = Harness::new();
    h.oracle
        .push_analysis(Reply::Ok(analysis("high", 30, &["draft", "review"])));

    let task = h
        .service()
        .create_task(CreateTask::new("  Write report ").description("quarterly numbers"))
        .await?;

    assert_eq!(task.title, "Write report");
    assert_eq!(task.status, TaskStatus::Scheduled);
    assert_eq!(task.priority, Some(Priority::High));
    assert_eq!(task.estimated_duration_minutes, Some(30));
    assert_eq!(task.suggested_subtasks, vec!["draft", "review"]);
    assert!(task.scheduled_at.is_none());
    assert_eq!(task.created_at, t0());
    assert_eq!(h.task(&task.id), task);
    assert_eq!(h.oracle.analyze_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn blank_title_is_rejected_before_anything_happens() -> TestResult {
    let h = Harness::new();

    let err = h.service().create_task(CreateTask::new("   ")).await.unwrap_err();

    assert!(matches!(err, TaskmasterError::Validation(_)));
    assert_eq!(h.oracle.analyze_calls(), 0);
    assert!(h.store.find_all()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unknown_dependency_is_not_found() -> TestResult {
    let h = Harness::new();

    let err = h
        .service()
        .create_task(CreateTask::new("child").depends_on(["nope"]))
        .await
        .unwrap_err();

    match err {
        TaskmasterError::NotFound(id) => assert_eq!(id, "nope"),
        other => panic!("Expected NotFound, got: {:?}", other),
    }
    assert_eq!(h.oracle.analyze_calls(), 0);
    assert!(h.store.find_all()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn oracle_failure_stores_nothing() -> TestResult {
    init_tracing();
    let h = Harness::new();
    h.oracle.push_analysis(Reply::Err("model offline".to_string()));

    let err = h.service().create_task(CreateTask::new("t")).await.unwrap_err();

    assert!(matches!(err, TaskmasterError::OracleFailure(_)));
    assert!(err.is_retryable());
    assert!(h.store.find_all()?.is_empty(), "failed creation must leave no record");
    Ok(())
}

#[tokio::test]
async fn oracle_timeout_stores_nothing() -> TestResult {
    let h = Harness::new();
    h.oracle.push_analysis(Reply::Hang);

    let err = h.service().create_task(CreateTask::new("t")).await.unwrap_err();

    match err {
        TaskmasterError::OracleFailure(msg) => assert!(msg.contains("no response")),
        other => panic!("Expected OracleFailure, got: {:?}", other),
    }
    assert!(h.store.find_all()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unusable_analysis_stores_nothing() -> TestResult {
    let h = Harness::new();
    h.oracle.push_analysis(Reply::Ok(analysis("URGENT", 30, &[])));
    h.oracle.push_analysis(Reply::Ok(analysis("LOW", 0, &[])));

    for _ in 0..2 {
        let err = h.service().create_task(CreateTask::new("t")).await.unwrap_err();
        assert!(matches!(err, TaskmasterError::OracleFailure(_)));
    }
    assert!(h.store.find_all()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_write_stores_nothing() -> TestResult {
    let h = Harness::with_store(FlakyStore::new());
    h.store.set_fail_writes(true);

    let err = h.service().create_task(CreateTask::new("t")).await.unwrap_err();

    assert!(matches!(err, TaskmasterError::PersistenceFailure(_)));
    assert!(h.store.find_all()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn task_under_analysis_is_not_visible() -> TestResult {
    init_tracing();
    let h = Harness::new();
    h.oracle.push_analysis(Reply::Hang);
    let service = h.service();

    // `join!` polls the creation first, so it is parked on the oracle while
    // the second branch looks at the store.
    let (created, (calls, visible)) = tokio::join!(
        service.create_task(CreateTask::new("A")),
        async { (h.oracle.analyze_calls(), h.store.find_all()) }
    );

    assert_eq!(calls, 1);
    assert!(visible?.is_empty(), "a task under analysis must not be stored");
    assert!(matches!(created, Err(TaskmasterError::OracleFailure(_))));
    assert!(h.store.find_all()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn reconcile_during_analysis_sees_nothing() -> TestResult {
    let h = Harness::new();
    h.oracle.push_analysis(Reply::Hang);
    let service = h.service();

    let (created, outcome) = tokio::join!(
        service.create_task(CreateTask::new("A")),
        taskmaster::engine::reconcile(&h.ctx, t0())
    );

    assert!(created.is_err());
    assert!(outcome.is_empty());
    assert_eq!(h.oracle.schedule_calls(), 0);
    assert!(h.store.find_all()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn dependency_deleted_during_analysis_aborts_creation() -> TestResult {
    let h = Harness::with_tasks([TaskBuilder::new("dep").build()]);
    h.oracle
        .push_analysis(Reply::Delayed(Duration::from_millis(50), analysis("LOW", 5, &[])));
    let service = h.service();

    let (created, deleted) = tokio::join!(
        service.create_task(CreateTask::new("A").depends_on(["dep"])),
        async { service.delete_task("dep") }
    );

    deleted?;
    assert!(matches!(created, Err(TaskmasterError::NotFound(id)) if id == "dep"));
    assert!(h.store.find_all()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn dependent_creation_and_gate() -> TestResult {
    let h = Harness::new();
    let service = h.service();

    let t1 = service.create_task(CreateTask::new("T1")).await?;
    let t2 = service
        .create_task(CreateTask::new("T2").depends_on([t1.id.clone()]))
        .await?;

    assert_eq!(t2.depends_on.iter().collect::<Vec<_>>(), vec![&t1.id]);
    assert!(!taskmaster::dag::dependencies_met(h.store.as_ref(), &t2));

    // Drive T1 to COMPLETED through the public operations.
    h.store.save(&TaskBuilder::new(&t1.id).status(TaskStatus::InProgress).build())?;
    service.complete_task(&t1.id)?;

    assert!(taskmaster::dag::dependencies_met(h.store.as_ref(), &t2));
    Ok(())
}

#[tokio::test]
async fn complete_twice_is_invalid_state() -> TestResult {
    let h = Harness::with_tasks([TaskBuilder::new("t").status(TaskStatus::InProgress).build()]);
    let service = h.service();
    h.clock.advance(TimeDelta::minutes(10));

    let done = service.complete_task("t")?;
    assert_eq!(done.status, TaskStatus::Completed);
    assert_eq!(done.completed_at, Some(t0() + TimeDelta::minutes(10)));

    let err = service.complete_task("t").unwrap_err();
    assert!(matches!(err, TaskmasterError::InvalidState { .. }));
    assert!(err.is_caller_error());
    Ok(())
}

#[tokio::test]
async fn fail_task_records_prefixed_reason() -> TestResult {
    let h = Harness::with_tasks([TaskBuilder::new("t").status(TaskStatus::Scheduled).build()]);

    let failed = h.service().fail_task("t", Some("network down"))?;

    assert_eq!(failed.status, TaskStatus::Failed);
    assert_eq!(failed.notes.len(), 1);
    assert_eq!(failed.notes[0].message, "Failure reason: network down");

    let err = h.service().fail_task("t", Some("again")).unwrap_err();
    assert!(matches!(err, TaskmasterError::InvalidState { .. }));
    assert_eq!(h.task("t").notes.len(), 1);
    Ok(())
}

#[tokio::test]
async fn operations_on_missing_tasks_are_not_found() {
    let h = Harness::new();
    let service = h.service();

    assert!(matches!(service.get_task("x"), Err(TaskmasterError::NotFound(_))));
    assert!(matches!(service.complete_task("x"), Err(TaskmasterError::NotFound(_))));
    assert!(matches!(service.cancel_task("x"), Err(TaskmasterError::NotFound(_))));
    assert!(matches!(service.delete_task("x"), Err(TaskmasterError::NotFound(_))));
    assert!(matches!(
        service.generate_plan("x").await,
        Err(TaskmasterError::NotFound(_))
    ));
}

#[tokio::test]
async fn update_status_routes_through_lifecycle() -> TestResult {
    let h = Harness::with_tasks([
        TaskBuilder::new("a").status(TaskStatus::Scheduled).step("go").build(),
        TaskBuilder::new("b").status(TaskStatus::Scheduled).build(),
        TaskBuilder::new("blocked")
            .status(TaskStatus::Scheduled)
            .step("go")
            .depends_on("b")
            .build(),
    ]);
    let service = h.service();

    let started = service.update_status("a", TaskStatus::InProgress)?;
    assert_eq!(started.status, TaskStatus::InProgress);
    assert_eq!(started.started_at, Some(t0()));

    let err = service.update_status("a", TaskStatus::Scheduled).unwrap_err();
    assert!(matches!(err, TaskmasterError::InvalidState { .. }));

    let err = service.update_status("blocked", TaskStatus::InProgress).unwrap_err();
    assert!(matches!(err, TaskmasterError::Validation(_)));

    let cancelled = service.update_status("b", TaskStatus::Cancelled)?;
    assert_eq!(cancelled.status, TaskStatus::Cancelled);
    Ok(())
}

#[tokio::test]
async fn generate_plan_stores_steps_and_skips_finished_tasks() -> TestResult {
    let h = Harness::with_tasks([
        TaskBuilder::new("open").status(TaskStatus::Scheduled).build(),
        TaskBuilder::new("done").status(TaskStatus::Completed).build(),
    ]);
    h.oracle.push_plan(Reply::Ok(plan(&["one", " ", "two"])));
    let service = h.service();

    let planned = service.generate_plan("open").await?;
    assert_eq!(planned.execution_steps, vec!["one", "two"]);
    assert_eq!(h.task("open").execution_steps, vec!["one", "two"]);

    let done = service.generate_plan("done").await?;
    assert!(done.execution_steps.is_empty());
    assert_eq!(h.oracle.plan_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn empty_plan_is_an_oracle_failure() -> TestResult {
    let h = Harness::with_tasks([TaskBuilder::new("t").status(TaskStatus::Scheduled).build()]);
    h.oracle.push_plan(Reply::Ok(plan(&[])));

    let err = h.service().generate_plan("t").await.unwrap_err();

    assert!(matches!(err, TaskmasterError::OracleFailure(_)));
    assert!(h.task("t").execution_steps.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_refuses_tasks_with_dependents() -> TestResult {
    let h = Harness::with_tasks([
        TaskBuilder::new("base").status(TaskStatus::Completed).build(),
        TaskBuilder::new("child").depends_on("base").build(),
    ]);
    let service = h.service();

    let err = service.delete_task("base").unwrap_err();
    match err {
        TaskmasterError::Validation(msg) => assert!(msg.contains("child")),
        other => panic!("Expected Validation, got: {:?}", other),
    }

    service.delete_task("child")?;
    service.delete_task("base")?;
    assert!(h.store.find_all()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn find_due_tasks_includes_exact_start_time() -> TestResult {
    let h = Harness::with_tasks([
        TaskBuilder::new("now").status(TaskStatus::Scheduled).scheduled_at(t0()).build(),
        TaskBuilder::new("later")
            .status(TaskStatus::Scheduled)
            .scheduled_at(t0() + TimeDelta::minutes(1))
            .build(),
    ]);

    let due = h.service().find_due_tasks(t0())?;

    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, "now");
    Ok(())
}
