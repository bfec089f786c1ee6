// tests/cli_args.rs

use clap::Parser;
use taskmaster::cli::{CliArgs, Command, LogLevel};
use taskmaster::logging::resolve_level;
use taskmaster::task::TaskStatus;

#[test]
fn create_collects_repeated_dependencies() {
    let args = CliArgs::try_parse_from([
        "taskmaster",
        "create",
        "--title",
        "Ship it",
        "--depends-on",
        "a",
        "--depends-on",
        "b",
    ])
    .unwrap();

    match args.command {
        Command::Create {
            title,
            description,
            depends_on,
        } => {
            assert_eq!(title, "Ship it");
            assert_eq!(description, "");
            assert_eq!(depends_on, vec!["a", "b"]);
        }
        other => panic!("Expected Create, got: {:?}", other),
    }
}

#[test]
fn global_flags_work_after_the_subcommand() {
    let args = CliArgs::try_parse_from([
        "taskmaster",
        "list",
        "--status",
        "in_progress",
        "--config",
        "custom.toml",
        "--log-level",
        "debug",
    ])
    .unwrap();

    assert!(matches!(
        args.command,
        Command::List {
            status: Some(TaskStatus::InProgress)
        }
    ));
    assert_eq!(args.config.as_deref(), Some(std::path::Path::new("custom.toml")));
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
}

#[test]
fn unknown_status_is_rejected() {
    assert!(CliArgs::try_parse_from(["taskmaster", "list", "--status", "paused"]).is_err());
}

#[test]
fn log_level_precedence() {
    assert_eq!(resolve_level(Some(LogLevel::Warn), Some("trace")), tracing::Level::WARN);
    assert_eq!(resolve_level(None, Some(" DEBUG ")), tracing::Level::DEBUG);
    assert_eq!(resolve_level(None, Some("loud")), tracing::Level::INFO);
    assert_eq!(resolve_level(None, None), tracing::Level::INFO);
}
