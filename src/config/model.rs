// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;
use serde::Deserialize;

use crate::types::StoreMode;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [orchestrator]
/// reconcile_interval = "1h"
/// initiate_interval  = "1m"
/// sweep_at           = "03:00"
/// retention          = "30d"
///
/// [oracle]
/// endpoint = "http://localhost:11434"
/// model    = "gemma3:4b"
/// timeout  = "60s"
///
/// [store]
/// mode = "file"
/// path = ".taskmaster/tasks.json"
/// ```
///
/// All sections are optional. Durations and times stay as strings here and
/// are checked when converting into [`ConfigFile`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub orchestrator: RawOrchestratorSection,

    #[serde(default)]
    pub oracle: RawOracleSection,

    #[serde(default)]
    pub store: RawStoreSection,
}

/// `[orchestrator]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOrchestratorSection {
    /// Delay between schedule reconciliation runs.
    #[serde(default = "default_reconcile_interval")]
    pub reconcile_interval: String,

    /// Delay between due-task initiation runs.
    #[serde(default = "default_initiate_interval")]
    pub initiate_interval: String,

    /// Daily UTC time (`"HH:MM"`) for the retention sweep.
    #[serde(default)]
    pub sweep_at: Option<String>,

    /// Fixed delay between sweeps; alternative to `sweep_at`.
    #[serde(default)]
    pub sweep_interval: Option<String>,

    /// How long terminal tasks are kept.
    #[serde(default = "default_retention")]
    pub retention: String,
}

fn default_reconcile_interval() -> String {
    "1h".to_string()
}

fn default_initiate_interval() -> String {
    "1m".to_string()
}

fn default_retention() -> String {
    "30d".to_string()
}

impl Default for RawOrchestratorSection {
    fn default() -> Self {
        Self {
            reconcile_interval: default_reconcile_interval(),
            initiate_interval: default_initiate_interval(),
            sweep_at: None,
            sweep_interval: None,
            retention: default_retention(),
        }
    }
}

/// `[oracle]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawOracleSection {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_oracle_timeout")]
    pub timeout: String,

    /// Ask the server to unload the model after every call.
    #[serde(default)]
    pub unload_after_use: bool,
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "gemma3:4b".to_string()
}

fn default_oracle_timeout() -> String {
    "60s".to_string()
}

impl Default for RawOracleSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            timeout: default_oracle_timeout(),
            unload_after_use: false,
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawStoreSection {
    #[serde(default)]
    pub mode: StoreMode,

    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(crate::store::DEFAULT_STORE_PATH)
}

impl Default for RawStoreSection {
    fn default() -> Self {
        Self {
            mode: StoreMode::default(),
            path: default_store_path(),
        }
    }
}

/// When the retention sweep fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepSchedule {
    /// Once a day at this UTC wall-clock time.
    DailyAt(NaiveTime),
    /// Fixed delay between runs.
    Every(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    pub reconcile_interval: Duration,
    pub initiate_interval: Duration,
    pub sweep: SweepSchedule,
    pub retention: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    pub unload_after_use: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub mode: StoreMode,
    pub path: PathBuf,
}

/// Validated configuration. Only constructed through
/// `TryFrom<RawConfigFile>`, so every value here has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub orchestrator: OrchestratorConfig,
    pub oracle: OracleConfig,
    pub store: StoreConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        orchestrator: OrchestratorConfig,
        oracle: OracleConfig,
        store: StoreConfig,
    ) -> Self {
        Self {
            orchestrator,
            oracle,
            store,
        }
    }
}
