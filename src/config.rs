//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::stats::{Thresholds, DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};
use crate::storage::DEFAULT_STORAGE_KEY;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Reading store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_storage_key")]
    pub key: String,

    #[serde(default = "default_seed_on_first_run")]
    pub seed_on_first_run: bool,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("glucose-log").to_string_lossy().to_string())
        .unwrap_or_else(|| "./glucose_data".to_string())
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_seed_on_first_run() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            key: default_storage_key(),
            seed_on_first_run: default_seed_on_first_run(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_path(&self) -> PathBuf {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.data_dir)),
            None => PathBuf::from(&self.data_dir),
        }
    }
}

/// Dashboard and history display configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_low_threshold")]
    pub low_threshold: f64,

    #[serde(default = "default_high_threshold")]
    pub high_threshold: f64,

    #[serde(default = "default_chart_points")]
    pub chart_points: usize,

    #[serde(default = "default_dashboard_days")]
    pub dashboard_days: usize,
}

fn default_low_threshold() -> f64 {
    DEFAULT_LOW_THRESHOLD
}

fn default_high_threshold() -> f64 {
    DEFAULT_HIGH_THRESHOLD
}

fn default_chart_points() -> usize {
    30
}

fn default_dashboard_days() -> usize {
    7
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            low_threshold: default_low_threshold(),
            high_threshold: default_high_threshold(),
            chart_points: default_chart_points(),
            dashboard_days: default_dashboard_days(),
        }
    }
}

impl DisplayConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.low_threshold, self.high_threshold)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment.
    ///
    /// Nothing is logged here since this runs before logging is set up;
    /// call [`ConfigSource::log`] once it is.
    pub fn load_default() -> (Self, ConfigSource) {
        let config_paths: Vec<PathBuf> = [
            dirs::config_dir().map(|p| p.join("glucose-log").join("config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect();

        Self::load_first(&config_paths)
    }

    /// Load the first existing file in `paths` that parses, else defaults
    pub fn load_first(paths: &[PathBuf]) -> (Self, ConfigSource) {
        let mut skipped = Vec::new();

        for path in paths.iter().filter(|p| p.exists()) {
            match Self::load_with_env(path) {
                Ok(config) => {
                    return (
                        config,
                        ConfigSource {
                            loaded: Some(path.clone()),
                            skipped,
                        },
                    )
                }
                Err(e) => skipped.push(e),
            }
        }

        (
            Self::from_env(),
            ConfigSource {
                loaded: None,
                skipped,
            },
        )
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `GLUCOSE_LOG_*` overrides read through `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(data_dir) = lookup("GLUCOSE_LOG_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(key) = lookup("GLUCOSE_LOG_STORAGE_KEY") {
            self.storage.key = key;
        }

        if let Some(level) = lookup("GLUCOSE_LOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("GLUCOSE_LOG_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Where [`Config::load_default`] found its configuration
#[derive(Debug, Default)]
pub struct ConfigSource {
    /// File the config came from; `None` means built-in defaults
    pub loaded: Option<PathBuf>,
    /// Candidate files that exist but failed to load
    pub skipped: Vec<ConfigError>,
}

impl ConfigSource {
    /// Report the outcome through tracing
    pub fn log(&self) {
        for error in &self.skipped {
            tracing::warn!("Skipped config file: {}", error);
        }
        match &self.loaded {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::debug!("Using default config with environment overrides"),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Glucose Log Configuration
#
# Environment variables override these settings:
# - GLUCOSE_LOG_DATA_DIR
# - GLUCOSE_LOG_STORAGE_KEY
# - GLUCOSE_LOG_LOG_LEVEL
# - GLUCOSE_LOG_LOG_FORMAT

[storage]
# Directory holding the readings file
data_dir = "~/.local/share/glucose-log"

# Name of the slot the readings are stored under
key = "glucose-readings"

# Fill an empty log with example readings on first run
seed_on_first_run = true

[display]
# Target range in mg/dL; values outside are highlighted, never rejected
low_threshold = 70.0
high_threshold = 140.0

# Number of most recent readings drawn in the trend chart
chart_points = 30

# Number of days shown in the dashboard's daily table
dashboard_days = 7

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"

# Optional log file path
# file = "/tmp/glucose-log.log"
"#
    .to_string()
}
