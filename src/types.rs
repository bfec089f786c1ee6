use std::str::FromStr;

use serde::Deserialize;

/// Where tasks are persisted.
///
/// - `File`: a JSON document on disk (default `.taskmaster/tasks.json`).
/// - `Memory`: process-local only; everything is lost on exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    #[default]
    File,
    Memory,
}

impl StoreMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            StoreMode::File => "file",
            StoreMode::Memory => "memory",
        }
    }
}

impl FromStr for StoreMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(StoreMode::File),
            "memory" => Ok(StoreMode::Memory),
            other => Err(format!(
                "invalid store mode: {other} (expected \"file\" or \"memory\")"
            )),
        }
    }
}
