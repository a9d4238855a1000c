// src/observability/mod.rs
//! Tracing and metrics initialisation
//!
//! Metric names emitted by the recorder:
//!
//! - `spikemon_events_ingested_total`: events accepted into in-memory buffers
//! - `spikemon_events_logged_total`: records appended to spike logs
//! - `spikemon_log_bytes_written_total`: bytes appended to spike logs
//! - `spikemon_windows_closed_total`: completed recording windows

use crate::utils::config::LoggingConfig;
use crate::utils::errors::{MonitorError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

pub const EVENTS_INGESTED: &str = "spikemon_events_ingested_total";
pub const EVENTS_LOGGED: &str = "spikemon_events_logged_total";
pub const LOG_BYTES_WRITTEN: &str = "spikemon_log_bytes_written_total";
pub const WINDOWS_CLOSED: &str = "spikemon_windows_closed_total";

static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the global tracing subscriber
///
/// `RUST_LOG` overrides `config.level` when set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| MonitorError::Config(format!("invalid log filter: {}", e)))?;

    let fmt_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .json()
            .with_filter(filter)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_filter(filter)
            .boxed()
    };

    Registry::default()
        .with(fmt_layer)
        .try_init()
        .map_err(|e| MonitorError::Config(format!("tracing already initialised: {}", e)))
}

/// Install the Prometheus metrics recorder
///
/// Idempotent: later calls reuse the first recorder.
pub fn init_metrics() -> Result<()> {
    PROMETHEUS
        .get_or_try_init(|| {
            PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| MonitorError::Config(format!("metrics recorder: {}", e)))
        })
        .map(|_| ())
}

/// Render current metrics in Prometheus text format
pub fn render_metrics() -> Option<String> {
    PROMETHEUS.get().map(|handle| handle.render())
}
