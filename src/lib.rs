// src/lib.rs
//! Spike monitor library
//!
//! Records the spikes of selected neuron groups over operator-controlled windows,
//! persists them in a compact binary log and computes firing-rate statistics.
//!
//! # Architecture
//!
//! The crate is structured into several modules:
//!
//! - **recording**: spike events, buffers, the binary spike log, statistics and the
//!   per-group monitor state machine
//! - **simulation**: clock, spike generators, monitor registry and a stepping simulator
//! - **observability**: tracing and metrics setup
//! - **utils**: errors and configuration
//!
//! # Example
//!
//! ```no_run
//! use spikemon::{PeriodicSpikeGenerator, Simulator};
//!
//! # fn main() -> spikemon::Result<()> {
//! let mut sim = Simulator::new("demo");
//! let input = sim.create_spike_generator_group("input", 3)?;
//! sim.set_spike_generator(input, Box::new(PeriodicSpikeGenerator::new(10.0)?))?;
//!
//! let monitor = sim.set_spike_monitor(input, Some(std::path::Path::new("spikes.dat")))?;
//! monitor.start_recording()?;
//! sim.run_network(2, 500)?;
//! monitor.stop_recording()?;
//!
//! assert_eq!(monitor.size(), 75);
//! # Ok(())
//! # }
//! ```

// Public module exports
pub mod observability;
pub mod recording;
pub mod simulation;
pub mod utils;

// Re-export commonly used types
pub use recording::{
    read_event_log, EventLog, EventLogReader, GroupMonitor, MonitorState, SpikeEvent, SpikeStats,
};
pub use simulation::{PeriodicSpikeGenerator, PoissonSpikeGenerator, Simulator, SpikeMonitor};
pub use utils::config::EngineConfig;
pub use utils::errors::{MonitorError, Result};

use serde::Serialize;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("GIT_HASH");

/// Build information
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            git_hash: GIT_HASH,
            build_timestamp: env!("BUILD_TIMESTAMP"),
            rustc_version: env!("RUSTC_VERSION"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_build_info() {
        let info = BuildInfo::current();
        assert!(!info.version.is_empty());
        assert!(!info.git_hash.is_empty());

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["version"], VERSION);
        assert!(json["rustc_version"].is_string());
    }
}
