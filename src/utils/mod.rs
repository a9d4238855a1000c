// src/utils/mod.rs
//! Common utilities: error types and configuration

pub mod config;
pub mod errors;

pub use self::config::{EngineConfig, LoggingConfig, MonitorConfig, ScenarioConfig};
pub use self::errors::{MonitorError, Result};
