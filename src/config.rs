//! `config.toml` handling for the command line front end.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Allowed range for the search quiet period, in milliseconds.
pub const DEBOUNCE_RANGE_MS: std::ops::RangeInclusive<u64> = 250..=500;

#[derive(Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    Missing(PathBuf),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(path) => write!(f, "config file not found: {}", path.display()),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("spendbook-data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_toml(data: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(data).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if !DEBOUNCE_RANGE_MS.contains(&cfg.search.debounce_ms) {
            return Err(ConfigError::Invalid(format!(
                "search.debounce_ms must be between {} and {}, got {}",
                DEBOUNCE_RANGE_MS.start(),
                DEBOUNCE_RANGE_MS.end(),
                cfg.search.debounce_ms
            )));
        }
        Ok(cfg)
    }

    /// Reads `path`. A missing file is an error only when `required`;
    /// otherwise the defaults are used.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(data) => Self::from_toml(&data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if required {
                    Err(ConfigError::Missing(path.to_path_buf()))
                } else {
                    Ok(Self::default())
                }
            }
            Err(e) => Err(ConfigError::Invalid(e.to_string())),
        }
    }
}
