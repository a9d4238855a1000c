// src/simulation/mod.rs
//! Simulator-side glue for the spike monitors
//!
//! - **Clock**: shared simulated time used to timestamp recording windows
//! - **Generator**: periodic and Poisson spike sources
//! - **Registry**: one monitor per group, and the cloneable monitor handle
//! - **Simulator**: groups, 1ms stepping and per-step spike delivery
//!
//! # Architecture
//!
//! ```text
//!  run_network()
//!      │  every 1ms step
//!      ▼
//!  SpikeGenerator ──spikes──▶ MonitorRegistry ──▶ GroupMonitor (group 0)
//!  deliver_events() ────────▶        │        ──▶ GroupMonitor (group 1)
//!                                    ▼
//!                        flush_all() at end of run
//! ```

pub mod clock;
pub mod generator;
pub mod registry;
pub mod simulator;

// Re-export commonly used types
pub use clock::SimClock;
pub use generator::{PeriodicSpikeGenerator, PoissonSpikeGenerator, SpikeGenerator};
pub use registry::{MonitorRegistry, SpikeMonitor};
pub use simulator::{GroupKind, Simulator};
