// src/lib.rs

pub mod cli;
pub mod clock;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod lifecycle;
pub mod logging;
pub mod oracle;
pub mod orchestrator;
pub mod service;
pub mod store;
pub mod task;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::clock::SystemClock;
use crate::config::{ConfigFile, SweepSchedule};
use crate::engine::EngineContext;
use crate::oracle::OllamaOracle;
use crate::orchestrator::Orchestrator;
use crate::service::{CreateTask, TaskService};
use crate::store::{FileTaskStore, MemoryTaskStore, TaskStore};
use crate::types::StoreMode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the task store and the oracle client
/// - the requested command (a single-task operation, one job, or the
///   orchestrator with Ctrl-C handling)
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = config::load_or_default(args.config.as_deref())?;

    if let Command::Run { dry_run: true, .. } = args.command {
        print_dry_run(&cfg);
        return Ok(());
    }

    let ctx = build_context(&cfg)?;
    let service = TaskService::new(ctx.clone());

    match args.command {
        Command::Run { once, .. } => {
            let orchestrator = Orchestrator::new(ctx, cfg.orchestrator.clone());
            if once {
                let stats = orchestrator.run_once().await;
                debug!(?stats, "single pass complete");
                return Ok(());
            }

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    eprintln!("failed to listen for Ctrl+C: {e}");
                    return;
                }
                info!("shutdown requested");
                let _ = shutdown_tx.send(true);
            });

            orchestrator.run(shutdown_rx).await;
        }
        Command::Create {
            title,
            description,
            depends_on,
        } => {
            let request = CreateTask::new(title)
                .description(description)
                .depends_on(depends_on);
            print_json(&service.create_task(request).await?)?;
        }
        Command::List { status } => {
            let tasks = match status {
                Some(status) => service.list_by_status(status)?,
                None => service.list_tasks()?,
            };
            print_json(&tasks)?;
        }
        Command::Show { id } => print_json(&service.get_task(&id)?)?,
        Command::Complete { id } => print_json(&service.complete_task(&id)?)?,
        Command::Fail { id, reason } => print_json(&service.fail_task(&id, reason.as_deref())?)?,
        Command::Cancel { id } => print_json(&service.cancel_task(&id)?)?,
        Command::Plan { id } => print_json(&service.generate_plan(&id).await?)?,
        Command::Delete { id } => {
            service.delete_task(&id)?;
            print_json(&serde_json::json!({ "deleted": id }))?;
        }
        Command::Reconcile => {
            let outcome = engine::reconcile(&ctx, ctx.clock.now()).await;
            print_json(&outcome)?;
        }
        Command::Initiate => {
            let outcome = engine::initiate_due(&ctx, ctx.clock.now()).await;
            print_json(&outcome)?;
        }
        Command::Sweep => {
            let deleted = engine::sweep(&ctx, cfg.orchestrator.retention).await;
            print_json(&serde_json::json!({ "deleted": deleted }))?;
        }
    }

    Ok(())
}

/// Build the store, oracle and clock described by `cfg`.
pub fn build_context(cfg: &ConfigFile) -> Result<EngineContext> {
    let store: Arc<dyn TaskStore> = match cfg.store.mode {
        StoreMode::File => Arc::new(
            FileTaskStore::open(&cfg.store.path)
                .with_context(|| format!("opening task store {}", cfg.store.path.display()))?,
        ),
        StoreMode::Memory => Arc::new(MemoryTaskStore::new()),
    };
    let oracle = Arc::new(OllamaOracle::from_config(&cfg.oracle)?);

    Ok(EngineContext::new(store, oracle, Arc::new(SystemClock))
        .with_oracle_timeout(cfg.oracle.timeout))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{text}");
    Ok(())
}

/// Simple dry-run output: print the effective configuration.
fn print_dry_run(cfg: &ConfigFile) {
    let orch = &cfg.orchestrator;
    println!("taskmaster dry-run");
    println!("  orchestrator.reconcile_interval = {:?}", orch.reconcile_interval);
    println!("  orchestrator.initiate_interval = {:?}", orch.initiate_interval);
    match orch.sweep {
        SweepSchedule::DailyAt(at) => println!("  orchestrator.sweep_at = {at} UTC"),
        SweepSchedule::Every(every) => println!("  orchestrator.sweep_interval = {every:?}"),
    }
    println!("  orchestrator.retention = {:?}", orch.retention);
    println!();
    println!("  oracle.endpoint = {}", cfg.oracle.endpoint);
    println!("  oracle.model = {}", cfg.oracle.model);
    println!("  oracle.timeout = {:?}", cfg.oracle.timeout);
    println!("  oracle.unload_after_use = {}", cfg.oracle.unload_after_use);
    println!();
    println!("  store.mode = {}", cfg.store.mode.as_str());
    if cfg.store.mode == StoreMode::File {
        println!("  store.path = {}", cfg.store.path.display());
    }

    debug!("dry-run complete (nothing executed)");
}
