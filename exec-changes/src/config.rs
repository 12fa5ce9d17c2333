//! Configuration for change detection and logging.

use crate::errors::{ExecutionError, ExecutionResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "EXEC_CHANGES_LOG_LEVEL";
/// Environment variable overriding the log format.
pub const ENV_LOG_FORMAT: &str = "EXEC_CHANGES_LOG_FORMAT";
/// Environment variable overriding the number of reported changes.
pub const ENV_MAX_REPORTED_CHANGES: &str = "EXEC_CHANGES_MAX_REPORTED_CHANGES";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Change detector settings.
    #[serde(default)]
    pub detector: DetectorConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ExecutionConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON.
    pub fn from_json_str(json: &str) -> ExecutionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> ExecutionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> ExecutionResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> ExecutionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.logging.format = format.parse()?;
        }
        if let Some(max) = lookup(ENV_MAX_REPORTED_CHANGES) {
            self.detector.max_reported_changes = max.trim().parse().map_err(|_| {
                ExecutionError::config(format!(
                    "{ENV_MAX_REPORTED_CHANGES} must be a non-negative integer, got '{max}'"
                ))
            })?;
        }
        Ok(self)
    }
}

/// Configuration for the default change detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Maximum number of change messages reported; `0` reports all.
    #[serde(default = "default_max_reported_changes")]
    pub max_reported_changes: usize,
}

fn default_max_reported_changes() -> usize {
    3
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_reported_changes: default_max_reported_changes(),
        }
    }
}

impl DetectorConfig {
    /// Sets the maximum number of reported changes.
    #[must_use]
    pub fn with_max_reported_changes(mut self, max: usize) -> Self {
        self.max_reported_changes = max;
        self
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ExecutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ExecutionError::config(format!("unknown log format '{other}'"))),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ExecutionConfig::new();
        assert_eq!(config.detector.max_reported_changes, 3);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ExecutionConfig::from_json_str(r#"{"logging": {"format": "json"}}"#).unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.detector, DetectorConfig::default());
    }

    #[test]
    fn test_from_json_file() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{"detector": {{"max_reported_changes": 10}}}}"#)?;

        let config = ExecutionConfig::from_json_file(file.path())?;
        assert_eq!(config.detector.max_reported_changes, 10);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ExecutionConfig::from_json_file("/nonexistent/exec-changes.json").unwrap_err();
        assert!(matches!(err, ExecutionError::Io(_)));
    }

    #[test]
    fn test_env_overrides_keep_values_when_unset() {
        if [ENV_LOG_LEVEL, ENV_LOG_FORMAT, ENV_MAX_REPORTED_CHANGES]
            .iter()
            .any(|key| std::env::var_os(key).is_some())
        {
            return;
        }
        let config = ExecutionConfig {
            detector: DetectorConfig::default().with_max_reported_changes(7),
            logging: LoggingConfig::default(),
        };

        let overridden = config.clone().with_env_overrides().unwrap();

        assert_eq!(overridden, config);
    }

    #[test]
    fn test_overrides() {
        let config = ExecutionConfig::new()
            .with_overrides(lookup(&[
                (ENV_LOG_LEVEL, "exec_changes=trace"),
                (ENV_LOG_FORMAT, "JSON"),
                (ENV_MAX_REPORTED_CHANGES, "0"),
            ]))
            .unwrap();

        assert_eq!(config.logging.level, "exec_changes=trace");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.detector.max_reported_changes, 0);
    }

    #[test]
    fn test_invalid_overrides_are_config_errors() {
        let err = ExecutionConfig::new()
            .with_overrides(lookup(&[(ENV_MAX_REPORTED_CHANGES, "many")]))
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Config(_)));

        let err = ExecutionConfig::new()
            .with_overrides(lookup(&[(ENV_LOG_FORMAT, "xml")]))
            .unwrap_err();
        assert!(err.to_string().contains("xml"));
    }
}
