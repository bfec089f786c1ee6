// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::task::TaskStatus;

/// Command-line arguments for `taskmaster`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskmaster",
    version,
    about = "Track tasks through their lifecycle, resolve dependencies and schedule work.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Taskmaster.toml` in the working directory if it exists,
    /// otherwise built-in defaults.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKMASTER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the periodic jobs until Ctrl-C.
    Run {
        /// Run each job once (reconcile, initiate, sweep) and exit.
        #[arg(long)]
        once: bool,

        /// Print the effective configuration and exit.
        #[arg(long)]
        dry_run: bool,
    },

    /// Create a task and have it analysed.
    Create {
        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Id of a task this one depends on. Repeatable.
        #[arg(long = "depends-on", value_name = "ID")]
        depends_on: Vec<String>,
    },

    /// List tasks, optionally filtered by status.
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },

    /// Show one task.
    Show { id: String },

    /// Mark an in-progress task completed.
    Complete { id: String },

    /// Mark a task failed.
    Fail {
        id: String,

        #[arg(long)]
        reason: Option<String>,
    },

    /// Cancel a task that has not finished.
    Cancel { id: String },

    /// Generate (or regenerate) a task's execution plan.
    Plan { id: String },

    /// Delete a task nothing depends on.
    Delete { id: String },

    /// Run one schedule reconciliation pass.
    Reconcile,

    /// Start every task whose scheduled time has arrived.
    Initiate,

    /// Delete terminal tasks older than the retention period.
    Sweep,
}

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    s.parse()
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
