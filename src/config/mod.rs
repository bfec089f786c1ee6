// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - `model.rs`: the TOML-backed raw model and the validated [`ConfigFile`].
//! - `loader.rs`: reading config files, with built-in defaults.
//! - `validate.rs`: `RawConfigFile -> ConfigFile`, duration and time parsing.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    default_config, load_and_validate, load_from_path, load_or_default, parse_and_validate,
};
pub use model::{
    ConfigFile, OracleConfig, OrchestratorConfig, RawConfigFile, StoreConfig, SweepSchedule,
};
pub use validate::{parse_duration, parse_time_of_day};
