// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TaskmasterError};

/// Config file looked up in the working directory when `--config` is omitted.
pub const DEFAULT_CONFIG_FILE: &str = "Taskmaster.toml";

/// Read and deserialize a config file without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Parse config text, then validate it.
pub fn parse_and_validate(contents: &str) -> Result<ConfigFile> {
    let raw: RawConfigFile = toml::from_str(contents)?;
    ConfigFile::try_from(raw)
}

/// Load a config file from `path` and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// The built-in defaults, as if an empty file had been loaded.
pub fn default_config() -> Result<ConfigFile> {
    ConfigFile::try_from(RawConfigFile::default())
}

/// Resolve the effective configuration.
///
/// - An explicit path must exist.
/// - Otherwise `Taskmaster.toml` in the working directory is used if present,
///   falling back to the built-in defaults.
pub fn load_or_default(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(TaskmasterError::ConfigError(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        info!(path = %path.display(), "loading config");
        return load_and_validate(path);
    }

    let path = default_config_path();
    if path.exists() {
        info!(path = %path.display(), "loading config");
        load_and_validate(&path)
    } else {
        debug!("no config file found; using defaults");
        default_config()
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
