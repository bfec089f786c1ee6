// src/config/validate.rs

use std::time::Duration;

use chrono::NaiveTime;

use crate::config::model::{
    ConfigFile, OracleConfig, OrchestratorConfig, RawConfigFile, RawOracleSection,
    RawOrchestratorSection, RawStoreSection, StoreConfig, SweepSchedule,
};
use crate::errors::{Result, TaskmasterError};

/// Sweep time used when neither `sweep_at` nor `sweep_interval` is set.
pub const DEFAULT_SWEEP_AT: &str = "03:00";

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = TaskmasterError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let orchestrator = validate_orchestrator(&raw.orchestrator)?;
        let oracle = validate_oracle(&raw.oracle)?;
        let store = validate_store(&raw.store)?;
        Ok(ConfigFile::new_unchecked(orchestrator, oracle, store))
    }
}

fn validate_orchestrator(raw: &RawOrchestratorSection) -> Result<OrchestratorConfig> {
    let reconcile_interval =
        positive_duration("orchestrator.reconcile_interval", &raw.reconcile_interval)?;
    let initiate_interval =
        positive_duration("orchestrator.initiate_interval", &raw.initiate_interval)?;
    let retention = positive_duration("orchestrator.retention", &raw.retention)?;

    let sweep = match (&raw.sweep_at, &raw.sweep_interval) {
        (Some(_), Some(_)) => {
            return Err(TaskmasterError::ConfigError(
                "[orchestrator] sets both sweep_at and sweep_interval; pick one".to_string(),
            ));
        }
        (None, Some(interval)) => {
            SweepSchedule::Every(positive_duration("orchestrator.sweep_interval", interval)?)
        }
        (Some(at), None) => SweepSchedule::DailyAt(time_of_day("orchestrator.sweep_at", at)?),
        (None, None) => {
            SweepSchedule::DailyAt(time_of_day("orchestrator.sweep_at", DEFAULT_SWEEP_AT)?)
        }
    };

    Ok(OrchestratorConfig {
        reconcile_interval,
        initiate_interval,
        sweep,
        retention,
    })
}

fn validate_oracle(raw: &RawOracleSection) -> Result<OracleConfig> {
    let endpoint = raw.endpoint.trim();
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(TaskmasterError::ConfigError(format!(
            "[oracle].endpoint must be an http(s) URL (got {endpoint:?})"
        )));
    }

    let model = raw.model.trim();
    if model.is_empty() {
        return Err(TaskmasterError::ConfigError(
            "[oracle].model must not be empty".to_string(),
        ));
    }

    Ok(OracleConfig {
        endpoint: endpoint.trim_end_matches('/').to_string(),
        model: model.to_string(),
        timeout: positive_duration("oracle.timeout", &raw.timeout)?,
        unload_after_use: raw.unload_after_use,
    })
}

fn validate_store(raw: &RawStoreSection) -> Result<StoreConfig> {
    if raw.path.as_os_str().is_empty() {
        return Err(TaskmasterError::ConfigError(
            "[store].path must not be empty".to_string(),
        ));
    }
    Ok(StoreConfig {
        mode: raw.mode,
        path: raw.path.clone(),
    })
}

fn positive_duration(key: &str, value: &str) -> Result<Duration> {
    let duration = parse_duration(value)
        .map_err(|e| TaskmasterError::ConfigError(format!("{key}: {e}")))?;
    if duration.is_zero() {
        return Err(TaskmasterError::ConfigError(format!(
            "{key} must be greater than zero"
        )));
    }
    Ok(duration)
}

fn time_of_day(key: &str, value: &str) -> Result<NaiveTime> {
    parse_time_of_day(value).map_err(|e| TaskmasterError::ConfigError(format!("{key}: {e}")))
}

/// Parse `"250ms"`, `"3s"`, `"5m"`, `"1h"` or `"30d"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{num_part}': {e}"))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{unit}'; expected ms, s, m, h or d"
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}

/// Parse a UTC wall-clock time, `"HH:MM"` or `"HH:MM:SS"`.
pub fn parse_time_of_day(s: &str) -> std::result::Result<NaiveTime, String> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| format!("invalid time of day '{s}'; expected HH:MM or HH:MM:SS"))
}
