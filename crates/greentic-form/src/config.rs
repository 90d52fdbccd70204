use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_FETCH_ERROR: &str = "Failed to load options.";
pub const DEFAULT_UNSUPPORTED_LABEL: &str = "Unsupported field type";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read engine config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("engine config is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Engine tunables. Every key is optional in TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Debounce window for fields that do not set `debounceMs`.
    pub default_debounce_ms: u64,
    /// Advisory text shown when an option resolver fails.
    pub fetch_error_message: String,
    /// Prefix of the placeholder rendered for unknown field types.
    pub unsupported_label: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_debounce_ms: DEFAULT_DEBOUNCE_MS,
            fetch_error_message: DEFAULT_FETCH_ERROR.to_string(),
            unsupported_label: DEFAULT_UNSUPPORTED_LABEL.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn debounce_for(&self, field_ms: Option<u64>) -> Duration {
        Duration::from_millis(field_ms.unwrap_or(self.default_debounce_ms))
    }
}
