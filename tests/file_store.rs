// tests/file_store.rs

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use chrono::TimeDelta;
use taskmaster::fs::mock::MockFileSystem;
use taskmaster::store::{FileTaskStore, MemoryTaskStore, TaskStore};
use taskmaster::task::TaskStatus;
use taskmaster_test_utils::{t0, TaskBuilder};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn tasks_survive_reopening() -> TestResult {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("tasks.json");

    {
        let store = FileTaskStore::open(&path)?;
        store.create(&TaskBuilder::new("a").priority(taskmaster::task::Priority::Low).build())?;
        store.create(&TaskBuilder::new("b").depends_on("a").build())?;
        store.save(&TaskBuilder::new("a").status(TaskStatus::Completed).build())?;
    }

    let reopened = FileTaskStore::open(&path)?;
    let a = reopened.get("a")?.ok_or("a missing")?;
    let b = reopened.get("b")?.ok_or("b missing")?;
    assert_eq!(a.status, TaskStatus::Completed);
    assert!(a.completed_at.is_some());
    assert!(b.depends_on.contains("a"));
    assert_eq!(reopened.find_all()?.len(), 2);
    assert!(!path.with_extension("tmp").exists());
    Ok(())
}

#[test]
fn missing_or_empty_file_opens_empty() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    let store = FileTaskStore::open_with(fs.clone(), "tasks.json")?;
    assert!(store.find_all()?.is_empty());

    fs.add_file("blank.json", "   \n");
    let store = FileTaskStore::open_with(fs, "blank.json")?;
    assert!(store.find_all()?.is_empty());
    Ok(())
}

#[test]
fn failed_write_leaves_store_unchanged() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    let store = FileTaskStore::open_with(fs.clone(), "tasks.json")?;
    store.create(&TaskBuilder::new("a").build())?;
    let on_disk = fs.contents("tasks.json");

    fs.set_fail_writes(true);
    assert!(store.create(&TaskBuilder::new("b").build()).is_err());
    assert!(store.delete("a").is_err());

    assert!(store.get("b")?.is_none());
    assert!(store.get("a")?.is_some());
    assert_eq!(fs.contents("tasks.json"), on_disk);
    Ok(())
}

#[test]
fn duplicate_create_is_rejected() -> TestResult {
    let store = FileTaskStore::open_with(Arc::new(MockFileSystem::new()), "tasks.json")?;
    store.create(&TaskBuilder::new("a").build())?;
    assert!(store.create(&TaskBuilder::new("a").build()).is_err());
    Ok(())
}

#[test]
fn cyclic_document_is_rejected_on_open() {
    let fs = Arc::new(MockFileSystem::new());
    let doc = serde_json::json!({
        "tasks": [
            TaskBuilder::new("a").depends_on("b").build(),
            TaskBuilder::new("b").depends_on("a").build(),
        ]
    });
    fs.add_file("tasks.json", doc.to_string());

    let err = FileTaskStore::open_with(fs, "tasks.json").unwrap_err();
    assert!(format!("{err:#}").contains("dependency cycle"));
}

#[test]
fn dangling_dependency_is_loaded() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    let doc = serde_json::json!({ "tasks": [TaskBuilder::new("a").depends_on("gone").build()] });
    fs.add_file("tasks.json", doc.to_string());

    let store = FileTaskStore::open_with(fs, "tasks.json")?;
    assert!(store.exists("a")?);
    Ok(())
}

#[test]
fn document_format_is_a_tasks_array() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    let store = FileTaskStore::open_with(fs.clone(), Path::new("tasks.json"))?;
    store.create(&TaskBuilder::new("a").build())?;

    let text = fs.contents("tasks.json").ok_or("no file written")?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(value["tasks"][0]["id"], "a");
    assert_eq!(value["tasks"][0]["status"], "PENDING");
    Ok(())
}

/// Both stores answer the same queries the same way.
#[test]
fn memory_and_file_queries_agree() -> TestResult {
    let tasks = vec![
        TaskBuilder::new("p").build(),
        TaskBuilder::new("s-due")
            .status(TaskStatus::Scheduled)
            .scheduled_at(t0() - TimeDelta::minutes(1))
            .build(),
        TaskBuilder::new("s-later")
            .status(TaskStatus::Scheduled)
            .scheduled_at(t0() + TimeDelta::minutes(1))
            .build(),
        TaskBuilder::new("c-old")
            .status(TaskStatus::Completed)
            .completed_at(t0() - TimeDelta::days(40))
            .build(),
        TaskBuilder::new("f-new")
            .status(TaskStatus::Failed)
            .completed_at(t0())
            .depends_on("p")
            .build(),
    ];

    let memory = MemoryTaskStore::with_tasks(tasks.clone())?;
    let file = FileTaskStore::open_with(Arc::new(MockFileSystem::new()), "tasks.json")?;
    for task in &tasks {
        file.create(task)?;
    }
    let stores: [&dyn TaskStore; 2] = [&memory, &file];

    for store in stores {
        let ids = |tasks: Vec<taskmaster::task::Task>| -> Vec<String> {
            tasks.into_iter().map(|t| t.id).collect()
        };
        assert_eq!(
            ids(store.find_by_status_due_before(TaskStatus::Scheduled, t0())?),
            vec!["s-due"]
        );
        assert_eq!(
            ids(store.find_by_status_in_completed_before(
                &TaskStatus::TERMINAL,
                t0() - TimeDelta::days(30)
            )?),
            vec!["c-old"]
        );
        assert_eq!(ids(store.find_dependents("p")?), vec!["f-new"]);
        assert_eq!(
            ids(store.find_all_by_id(&["p".to_string(), "nope".to_string()])?),
            vec!["p"]
        );
        assert_eq!(store.find_by_status(TaskStatus::Scheduled)?.len(), 2);
    }
    Ok(())
}
