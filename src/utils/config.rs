// src/utils/config.rs
//! Layered configuration
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. `spikemon.{toml,yaml,json}` in the working directory, or the file named by `SPIKEMON_CONFIG`
//! 3. Environment variables, e.g. `SPIKEMON__MONITOR__LOG_FLUSH_THRESHOLD=1024`

use crate::utils::errors::{MonitorError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub monitor: MonitorConfig,
    pub scenario: ScenarioConfig,
}

/// Tracing output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Per-monitor tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Initial capacity of the in-memory spike buffer (events)
    pub buffer_capacity_hint: usize,

    /// Staged log records that trigger an early append to disk
    pub log_flush_threshold: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            buffer_capacity_hint: 4096,
            log_flush_threshold: 65_536,
        }
    }
}

/// Off/on/off recording scenario run by the `spikemon` binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Periodic generator rate (Hz)
    pub rate_hz: f64,

    /// Neurons in the generator group
    pub group_size: usize,

    /// Time run with recording off, before and after the window (ms)
    pub off_ms: u32,

    /// Length of the recording window (ms)
    pub on_ms: u32,

    /// Directory receiving the spike log
    pub output_dir: PathBuf,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            rate_hz: 10.0,
            group_size: 2,
            off_ms: 500,
            on_ms: 1000,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl EngineConfig {
    /// Load configuration from defaults, optional file and environment
    pub fn load() -> Result<Self> {
        let file = std::env::var("SPIKEMON_CONFIG").unwrap_or_else(|_| "spikemon".to_string());
        Self::load_from(&file)
    }

    /// Load configuration using `file` (extension optional) as the file source
    pub fn load_from(file: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(file).required(false))
            .add_source(
                Environment::with_prefix("SPIKEMON")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: EngineConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the recorder cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.monitor.log_flush_threshold == 0 {
            return Err(MonitorError::Config(
                "monitor.log_flush_threshold must be > 0".to_string(),
            ));
        }
        if self.scenario.group_size == 0 {
            return Err(MonitorError::Config(
                "scenario.group_size must be > 0".to_string(),
            ));
        }
        if !(self.scenario.rate_hz > 0.0 && self.scenario.rate_hz <= 1000.0) {
            return Err(MonitorError::Config(format!(
                "scenario.rate_hz must be in (0, 1000], got {}",
                self.scenario.rate_hz
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.monitor.log_flush_threshold, 65_536);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[monitor]\nlog_flush_threshold = 128\n\n[scenario]\ngroup_size = 3").unwrap();

        let config = EngineConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(config.monitor.log_flush_threshold, 128);
        assert_eq!(config.scenario.group_size, 3);
        // Untouched fields keep their defaults
        assert_eq!(config.scenario.on_ms, 1000);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = EngineConfig::load_from("definitely-not-here").unwrap();
        assert_eq!(config.monitor.buffer_capacity_hint, 4096);
    }

    #[test]
    fn test_validate_rejects_zero_threshold() {
        let mut config = EngineConfig::default();
        config.monitor.log_flush_threshold = 0;
        assert!(matches!(config.validate(), Err(MonitorError::Config(_))));
    }
}
