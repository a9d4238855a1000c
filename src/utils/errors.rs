// src/utils/errors.rs
//! Error types for the spike recorder
//!
//! Two families of failure exist:
//! - **Usage errors**: invalid state transitions or arguments. They indicate a caller bug
//!   and are returned immediately; the monitor state is left untouched.
//! - **Resource errors**: spike log open/write/read failures. They are never retried.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for recorder operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors raised by monitors, spike logs and the simulator glue
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("group {group_id}: recording already in progress")]
    AlreadyRecording { group_id: usize },

    #[error("group {group_id}: recording is not in progress")]
    NotRecording { group_id: usize },

    #[error("group {group_id}: statistics requested while recording is still in progress")]
    StillRecording { group_id: usize },

    #[error("group {group_id}: no recording window has been closed yet")]
    NoRecordingWindow { group_id: usize },

    #[error("invalid group id {0}")]
    InvalidGroup(usize),

    #[error("group {group_id}: group size must be at least 1")]
    InvalidGroupSize { group_id: usize },

    #[error("group {group_id}: neuron id {neuron_id} out of range for group size {group_size}")]
    NeuronOutOfRange {
        group_id: usize,
        neuron_id: i32,
        group_size: usize,
    },

    #[error("group {group_id}: non-monotonic spike time {time_ms}ms after {last_ms}ms")]
    NonMonotonicTime {
        group_id: usize,
        time_ms: i32,
        last_ms: i32,
    },

    #[error("group {group_id}: spike at {time_ms}ms is ahead of simulation time {now_ms}ms")]
    FutureSpike {
        group_id: usize,
        time_ms: i32,
        now_ms: i32,
    },

    #[error("group {0} already has a spike monitor")]
    DuplicateMonitor(usize),

    #[error("group {0} has no spike monitor")]
    UnknownGroup(usize),

    #[error("invalid firing rate {0} Hz")]
    InvalidRate(f64),

    #[error("failed to open spike log {path:?}: {source}")]
    LogOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write spike log {path:?}: {source}")]
    LogWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read spike log {path:?}: {source}")]
    LogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("spike log {path:?} is corrupt: {len} bytes is not a multiple of the record size")]
    LogCorrupt { path: PathBuf, len: u64 },

    #[error("export failed: {0}")]
    ExportFailed(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl MonitorError {
    /// True for errors caused by the caller misusing the API
    pub fn is_usage_error(&self) -> bool {
        !matches!(
            self,
            MonitorError::LogOpen { .. }
                | MonitorError::LogWrite { .. }
                | MonitorError::LogRead { .. }
                | MonitorError::LogCorrupt { .. }
                | MonitorError::ExportFailed(_)
                | MonitorError::Config(_)
        )
    }
}

impl From<config::ConfigError> for MonitorError {
    fn from(err: config::ConfigError) -> Self {
        MonitorError::Config(err.to_string())
    }
}
