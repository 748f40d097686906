//! Analyzer configuration
//!
//! Loaded from a JSON file. Every field is optional; missing fields take
//! their defaults and the result is validated before use.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::binding::Features;
use crate::delegation::hints::{is_supported_locale, DEFAULT_LOCALE};
use crate::observability::{Logger, Severity};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid log_level '{0}': must be trace, info, warn, error or fatal")]
    InvalidLogLevel(String),

    #[error("Unsupported locale '{0}'")]
    UnsupportedLocale(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "DELEG_CONFIG_READ",
            ConfigError::Parse(_) => "DELEG_CONFIG_PARSE",
            ConfigError::InvalidLogLevel(_) => "DELEG_CONFIG_LOG_LEVEL",
            ConfigError::UnsupportedLocale(_) => "DELEG_CONFIG_LOCALE",
        }
    }
}

/// Where delegation telemetry goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryMode {
    /// Collected in memory and included in command output
    #[default]
    Memory,
    /// Written as structured log lines
    Log,
    Off,
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Default binder feature flags; a case may add to them
    #[serde(default)]
    pub features: Features,

    /// Minimum log severity (default "warn")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Locale for suggestion messages (default "en-US")
    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default)]
    pub telemetry: TelemetryMode,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            features: Features::default(),
            log_level: default_log_level(),
            locale: default_locale(),
            telemetry: TelemetryMode::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load and validate configuration from a JSON file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: AnalyzerConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        self.severity()?;
        if !is_supported_locale(&self.locale) {
            return Err(ConfigError::UnsupportedLocale(self.locale.clone()));
        }
        Ok(())
    }

    pub fn severity(&self) -> ConfigResult<Severity> {
        Severity::parse(&self.log_level)
            .ok_or_else(|| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    /// Sets the process-wide log filter
    pub fn apply_logging(&self) -> ConfigResult<()> {
        Logger::set_min_severity(self.severity()?);
        Ok(())
    }
}
