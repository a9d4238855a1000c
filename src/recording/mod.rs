// src/recording/mod.rs
//! Spike recording
//!
//! This module captures spikes per neuron group and derives firing statistics:
//!
//! - **Event**: address-event (time, neuron id) pair
//! - **Event Buffer**: in-memory spikes of the current recording window(s)
//! - **Event Log**: append-only binary spike file and its memory-mapped reader
//! - **Statistics**: group and per-neuron firing rates
//! - **Monitor**: the per-group recording state machine tying the above together
//! - **Exporter**: JSON, CSV and text dumps of captured spikes
//!
//! # Architecture
//!
//! ```text
//! Simulator step → GroupMonitor::ingest()
//!                        │
//!          ┌─────────────┴──────────────┐
//!          ▼                            ▼
//!   staged log records          EventBuffer (recording only)
//!          │                            │
//!   stop / run end / drop        stop_recording()
//!          ▼                            ▼
//!   EventLog (append-only)        SpikeStats
//! ```

pub mod event;
pub mod event_buffer;
pub mod event_log;
pub mod exporter;
pub mod monitor;
pub mod statistics;

// Re-export commonly used types
pub use event::{SpikeEvent, RECORD_SIZE};
pub use event_buffer::EventBuffer;
pub use event_log::{read_event_log, EventLog, EventLogReader};
pub use exporter::{ExportFormat, Exporter};
pub use monitor::{GroupMonitor, MonitorState, MonitorStats, RecordingWindow};
pub use statistics::SpikeStats;
