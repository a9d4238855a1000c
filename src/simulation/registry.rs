// src/simulation/registry.rs
//! Group → monitor registry and the operator-facing monitor handle
//!
//! The simulator owns one registry; at most one monitor exists per group. Operators
//! get a cloneable [`SpikeMonitor`] handle that timestamps transitions with the shared
//! simulation clock. Each monitor sits behind its own lock, so monitors for different
//! groups never contend with each other.

use crate::recording::event::SpikeEvent;
use crate::recording::monitor::{GroupMonitor, MonitorState, RecordingWindow};
use crate::recording::statistics::SpikeStats;
use crate::simulation::clock::SimClock;
use crate::utils::errors::{MonitorError, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Shared handle to a group's spike monitor
#[derive(Debug, Clone)]
pub struct SpikeMonitor {
    inner: Arc<Mutex<GroupMonitor>>,
    clock: Arc<SimClock>,
}

impl SpikeMonitor {
    pub(crate) fn new(monitor: GroupMonitor, clock: Arc<SimClock>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(monitor)),
            clock,
        }
    }

    /// Open a recording window at the current simulation time
    pub fn start_recording(&self) -> Result<()> {
        self.inner.lock().start_recording(self.clock.now_ms())
    }

    /// Close the recording window at the current simulation time
    pub fn stop_recording(&self) -> Result<()> {
        self.inner.lock().stop_recording(self.clock.now_ms())
    }

    /// Reset the captured spikes and invalidate statistics
    pub fn clear(&self) {
        self.inner.lock().clear()
    }

    /// Spikes captured since the buffer was last reset
    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    /// Copy of the captured spikes
    pub fn events(&self) -> Vec<SpikeEvent> {
        self.inner.lock().events()
    }

    /// Mean firing rate of the group (Hz)
    pub fn grp_firing_rate(&self) -> Result<f32> {
        self.inner.lock().grp_firing_rate()
    }

    /// Highest per-neuron firing rate (Hz)
    pub fn max_neuron_firing_rate(&self) -> Result<f32> {
        self.inner.lock().max_neuron_firing_rate()
    }

    /// Lowest per-neuron firing rate (Hz), silent neurons included
    pub fn min_neuron_firing_rate(&self) -> Result<f32> {
        self.inner.lock().min_neuron_firing_rate()
    }

    /// Firing rate per neuron (Hz), indexed by group-local id
    pub fn neuron_firing_rates(&self) -> Result<Vec<f32>> {
        self.inner.lock().neuron_firing_rates()
    }

    /// Per-neuron firing rates in ascending order
    pub fn sorted_neuron_firing_rates(&self) -> Result<Vec<f32>> {
        self.inner.lock().sorted_neuron_firing_rates()
    }

    /// Spike count per neuron, indexed by group-local id
    pub fn neuron_num_spikes(&self) -> Result<Vec<u32>> {
        self.inner.lock().neuron_num_spikes()
    }

    /// Neurons firing within `[min_hz, max_hz]`
    pub fn num_neurons_with_firing_rate(&self, min_hz: f32, max_hz: f32) -> Result<usize> {
        self.inner.lock().num_neurons_with_firing_rate(min_hz, max_hz)
    }

    /// Share of neurons firing within `[min_hz, max_hz]`, in percent
    pub fn percent_neurons_with_firing_rate(&self, min_hz: f32, max_hz: f32) -> Result<f32> {
        self.inner.lock().percent_neurons_with_firing_rate(min_hz, max_hz)
    }

    /// Neurons that did not fire during the window
    pub fn num_silent_neurons(&self) -> Result<usize> {
        self.inner.lock().num_silent_neurons()
    }

    /// Share of silent neurons, in percent
    pub fn percent_silent_neurons(&self) -> Result<f32> {
        self.inner.lock().percent_silent_neurons()
    }

    /// Snapshot of the last closed window's statistics
    pub fn spike_stats(&self) -> Result<SpikeStats> {
        self.inner.lock().spike_stats().cloned()
    }

    /// Same as [`size`](Self::size)
    pub fn pop_num_spikes(&self) -> usize {
        self.inner.lock().pop_num_spikes()
    }

    /// Keep the buffer across `start_recording` calls when `true`
    pub fn set_persistent(&self, persistent: bool) {
        self.inner.lock().set_persistent(persistent)
    }

    /// Check if the buffer accumulates across windows
    pub fn is_persistent(&self) -> bool {
        self.inner.lock().is_persistent()
    }

    /// Current recording state
    pub fn state(&self) -> MonitorState {
        self.inner.lock().state()
    }

    /// Check if a window is open
    pub fn is_recording(&self) -> bool {
        self.inner.lock().is_recording()
    }

    /// Start of the window in progress, or of the last closed window
    pub fn recording_start_time_ms(&self) -> Option<i32> {
        self.inner.lock().recording_start_time_ms()
    }

    /// Stop time of the last closed window; `None` while recording
    pub fn recording_stop_time_ms(&self) -> Option<i32> {
        self.inner.lock().recording_stop_time_ms()
    }

    /// Last closed window
    pub fn last_window(&self) -> Option<RecordingWindow> {
        self.inner.lock().last_window()
    }

    /// Duration of the last closed window; the rate denominator
    pub fn last_window_duration_ms(&self) -> Option<u32> {
        self.inner.lock().last_window_duration_ms()
    }

    /// Summed duration of the windows closed since the buffer was last reset
    pub fn total_recording_time_ms(&self) -> u64 {
        self.inner.lock().total_recording_time_ms()
    }

    /// Monitored group
    pub fn group_id(&self) -> usize {
        self.inner.lock().group_id()
    }

    /// Neurons in the monitored group
    pub fn group_size(&self) -> usize {
        self.inner.lock().group_size()
    }

    /// Spike log location, if the monitor writes one
    pub fn log_path(&self) -> Option<PathBuf> {
        self.inner.lock().log_path().map(|p| p.to_path_buf())
    }

    /// Append staged records to the spike log now
    pub fn flush_log(&self) -> Result<usize> {
        self.inner.lock().flush_log()
    }

    /// Log a one-shot summary of the monitor
    pub fn print_summary(&self) {
        self.inner.lock().print_summary()
    }

    pub(crate) fn ingest(&self, events: &[SpikeEvent]) -> Result<usize> {
        self.inner.lock().ingest(events)
    }
}

/// Monitors keyed by group id
#[derive(Debug, Default)]
pub struct MonitorRegistry {
    monitors: BTreeMap<usize, SpikeMonitor>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the monitor for its group
    pub fn insert(&mut self, monitor: SpikeMonitor) -> Result<SpikeMonitor> {
        let group_id = monitor.group_id();
        if self.monitors.contains_key(&group_id) {
            return Err(MonitorError::DuplicateMonitor(group_id));
        }
        self.monitors.insert(group_id, monitor.clone());
        debug!("Registered spike monitor for group {}", group_id);
        Ok(monitor)
    }

    /// Handle for a group's monitor
    pub fn get(&self, group_id: usize) -> Option<&SpikeMonitor> {
        self.monitors.get(&group_id)
    }

    /// Check if a group is monitored
    pub fn contains(&self, group_id: usize) -> bool {
        self.monitors.contains_key(&group_id)
    }

    /// Unregister a group's monitor
    ///
    /// The monitor itself is destroyed (and its log flushed) once the last handle goes.
    pub fn remove(&mut self, group_id: usize) -> Result<SpikeMonitor> {
        self.monitors
            .remove(&group_id)
            .ok_or(MonitorError::UnknownGroup(group_id))
    }

    /// Monitors in ascending group order
    pub fn iter(&self) -> impl Iterator<Item = &SpikeMonitor> {
        self.monitors.values()
    }

    /// Number of monitored groups
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    /// Check if no group is monitored
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// Flush every monitor's staged log records
    pub fn flush_all(&self) -> Result<usize> {
        let mut written = 0;
        for monitor in self.monitors.values() {
            written += monitor.flush_log()?;
        }
        Ok(written)
    }
}
