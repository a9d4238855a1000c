// src/recording/monitor.rs
//! Per-group spike monitor
//!
//! A `GroupMonitor` owns two independent collections:
//!
//! - an in-memory [`EventBuffer`] holding the spikes captured while recording, which feeds
//!   the firing-rate statistics and is reset by `clear()`;
//! - an optional append-only [`EventLog`] holding every spike the group emitted since the
//!   monitor was created, recording or not.
//!
//! ```text
//! Idle ──start_recording()──▶ Recording ──stop_recording()──▶ Idle
//!                                              │
//!                         flush staged records ┤
//!                        recompute statistics ─┘
//! ```
//!
//! Spikes destined for the log are staged in memory and appended in one write when a
//! window closes, when the simulator finishes a run, when the staged batch reaches the
//! configured threshold, on `flush_log()`, and on drop.

use crate::observability::{EVENTS_INGESTED, WINDOWS_CLOSED};
use crate::recording::event::SpikeEvent;
use crate::recording::event_buffer::EventBuffer;
use crate::recording::event_log::EventLog;
use crate::recording::statistics::SpikeStats;
use crate::utils::config::MonitorConfig;
use crate::utils::errors::{MonitorError, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, trace, warn};

/// Recording state of a monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorState {
    Idle,
    Recording,
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorState::Idle => write!(f, "idle"),
            MonitorState::Recording => write!(f, "recording"),
        }
    }
}

/// A closed recording window `[start_ms, stop_ms)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordingWindow {
    pub start_ms: i32,
    pub stop_ms: i32,
}

impl RecordingWindow {
    /// Window length; 0 for a window closed where it opened
    pub fn duration_ms(&self) -> u32 {
        self.stop_ms.abs_diff(self.start_ms)
    }
}

/// Monitor bookkeeping
#[derive(Debug, Clone, Default)]
pub struct MonitorStats {
    /// Spikes delivered to the monitor (recording or not)
    pub events_delivered: u64,

    /// Spikes captured into the buffer
    pub events_captured: u64,

    /// Completed recording windows
    pub windows_closed: u64,

    /// Appends made to the spike log
    pub log_flushes: u64,
}

/// Spike monitor for one neuron group
#[derive(Debug)]
pub struct GroupMonitor {
    group_id: usize,
    group_size: usize,
    state: MonitorState,
    persistent: bool,

    buffer: EventBuffer,
    log: Option<EventLog>,
    /// Records waiting to be appended to `log`
    staged: Vec<SpikeEvent>,
    flush_threshold: usize,

    /// Start of the window in progress
    window_start_ms: Option<i32>,
    last_window: Option<RecordingWindow>,
    /// Summed duration of windows closed since the buffer was last reset
    total_recording_ms: u64,
    last_delivered_ms: Option<i32>,

    /// Statistics for the last closed window; `None` while recording or before any window
    cached_stats: Option<SpikeStats>,
    stats: MonitorStats,
}

impl GroupMonitor {
    /// Create a monitor for `group_size` neurons of group `group_id`
    ///
    /// When `log_path` is given the spike log is opened (or created) for appending
    /// right away, so an unwritable path fails here and not at the first flush.
    pub fn new(
        group_id: usize,
        group_size: usize,
        log_path: Option<&Path>,
        config: &MonitorConfig,
    ) -> Result<Self> {
        if group_size == 0 {
            return Err(MonitorError::InvalidGroupSize { group_id });
        }

        let log = log_path.map(EventLog::open).transpose()?;

        info!(
            "Created spike monitor for group {} ({} neurons, log: {:?})",
            group_id, group_size, log_path
        );

        Ok(Self {
            group_id,
            group_size,
            state: MonitorState::Idle,
            persistent: false,
            buffer: EventBuffer::new(config.buffer_capacity_hint),
            log,
            staged: Vec::new(),
            flush_threshold: config.log_flush_threshold.max(1),
            window_start_ms: None,
            last_window: None,
            total_recording_ms: 0,
            last_delivered_ms: None,
            cached_stats: None,
            stats: MonitorStats::default(),
        })
    }

    /// Open a recording window at `now_ms`
    ///
    /// In non-persistent mode the buffer is reset first.
    pub fn start_recording(&mut self, now_ms: i32) -> Result<()> {
        if self.state == MonitorState::Recording {
            return Err(MonitorError::AlreadyRecording {
                group_id: self.group_id,
            });
        }

        if !self.persistent {
            self.buffer.clear();
            self.total_recording_ms = 0;
        }

        self.state = MonitorState::Recording;
        self.window_start_ms = Some(now_ms);
        self.cached_stats = None;

        info!("Group {}: recording started at {}ms", self.group_id, now_ms);
        Ok(())
    }

    /// Close the current window at `now_ms`, flush the log and recompute statistics
    ///
    /// Statistics are recomputed before the log is written, so they stay queryable
    /// even if the append fails. The staged records are kept on failure.
    pub fn stop_recording(&mut self, now_ms: i32) -> Result<()> {
        let start_ms = match (self.state, self.window_start_ms) {
            (MonitorState::Recording, Some(start_ms)) => start_ms,
            _ => {
                return Err(MonitorError::NotRecording {
                    group_id: self.group_id,
                })
            }
        };
        if now_ms < start_ms {
            return Err(MonitorError::NonMonotonicTime {
                group_id: self.group_id,
                time_ms: now_ms,
                last_ms: start_ms,
            });
        }

        let window = RecordingWindow {
            start_ms,
            stop_ms: now_ms,
        };
        self.state = MonitorState::Idle;
        self.window_start_ms = None;
        self.last_window = Some(window);
        self.total_recording_ms += u64::from(window.duration_ms());
        self.stats.windows_closed += 1;

        let beyond_window = self.buffer.truncate_from(now_ms);
        if beyond_window > 0 {
            self.stats.events_captured -= beyond_window as u64;
            warn!(
                "Group {}: discarded {} spikes stamped at or after the window stop {}ms",
                self.group_id, beyond_window, now_ms
            );
        }
        metrics::counter!(WINDOWS_CLOSED).increment(1);

        self.recompute_stats();

        info!(
            "Group {}: recording stopped at {}ms ({}ms window, {} spikes buffered)",
            self.group_id,
            now_ms,
            window.duration_ms(),
            self.buffer.len()
        );

        self.flush_log()?;
        Ok(())
    }

    /// Reset the buffer and invalidate statistics; the spike log is left untouched
    ///
    /// Rate queries report `NoRecordingWindow` until the next window closes.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.total_recording_ms = 0;
        self.cached_stats = None;
        debug!("Group {}: spike buffer cleared", self.group_id);
    }

    /// Accept one simulation step's spikes
    ///
    /// Every spike is staged for the log; spikes are captured into the buffer only while
    /// recording. The batch is validated as a whole and rejected without side effects if
    /// a neuron id is out of range or time runs backwards. Returns the number captured.
    pub fn ingest(&mut self, events: &[SpikeEvent]) -> Result<usize> {
        self.validate(events)?;
        if events.is_empty() {
            return Ok(0);
        }

        self.last_delivered_ms = events.last().map(|e| e.time_ms);
        self.stats.events_delivered += events.len() as u64;

        if self.log.is_some() {
            self.staged.extend_from_slice(events);
        }

        let captured = match (self.state, self.window_start_ms) {
            (MonitorState::Recording, Some(start_ms)) => {
                // Batches are time-sorted; skip spikes that predate the window
                let first = events.partition_point(|e| e.time_ms < start_ms);
                let window_events = &events[first..];
                self.buffer.extend_from_slice(window_events);
                self.stats.events_captured += window_events.len() as u64;
                metrics::counter!(EVENTS_INGESTED).increment(window_events.len() as u64);
                window_events.len()
            }
            _ => 0,
        };

        trace!(
            "Group {}: {} spikes delivered, {} captured",
            self.group_id,
            events.len(),
            captured
        );

        if self.staged.len() >= self.flush_threshold {
            self.flush_log()?;
        }

        Ok(captured)
    }

    fn validate(&self, events: &[SpikeEvent]) -> Result<()> {
        let mut last = self.last_delivered_ms;
        for event in events {
            let in_range = usize::try_from(event.neuron_id)
                .map(|id| id < self.group_size)
                .unwrap_or(false);
            if !in_range {
                return Err(MonitorError::NeuronOutOfRange {
                    group_id: self.group_id,
                    neuron_id: event.neuron_id,
                    group_size: self.group_size,
                });
            }
            if let Some(last_ms) = last {
                if event.time_ms < last_ms {
                    return Err(MonitorError::NonMonotonicTime {
                        group_id: self.group_id,
                        time_ms: event.time_ms,
                        last_ms,
                    });
                }
            }
            last = Some(event.time_ms);
        }
        Ok(())
    }

    /// Append staged records to the spike log
    ///
    /// Returns the number of records written; 0 when there is no log.
    pub fn flush_log(&mut self) -> Result<usize> {
        let Some(log) = self.log.as_mut() else {
            return Ok(0);
        };
        if self.staged.is_empty() {
            return Ok(0);
        }

        log.append(&self.staged)?;
        let written = self.staged.len();
        self.staged.clear();
        self.stats.log_flushes += 1;

        debug!("Group {}: flushed {} records to spike log", self.group_id, written);
        Ok(written)
    }

    fn recompute_stats(&mut self) {
        let duration_ms = self.last_window.map(|w| w.duration_ms()).unwrap_or(0);
        self.cached_stats = Some(SpikeStats::compute(
            self.buffer.events(),
            self.group_size,
            duration_ms,
        ));
    }

    /// Statistics of the last closed window
    pub fn spike_stats(&self) -> Result<&SpikeStats> {
        if self.state == MonitorState::Recording {
            return Err(MonitorError::StillRecording {
                group_id: self.group_id,
            });
        }
        self.cached_stats
            .as_ref()
            .ok_or(MonitorError::NoRecordingWindow {
                group_id: self.group_id,
            })
    }

    /// Mean firing rate of the group (Hz)
    pub fn grp_firing_rate(&self) -> Result<f32> {
        Ok(self.spike_stats()?.grp_firing_rate)
    }

    /// Highest per-neuron firing rate (Hz)
    pub fn max_neuron_firing_rate(&self) -> Result<f32> {
        Ok(self.spike_stats()?.max_neuron_firing_rate)
    }

    /// Lowest per-neuron firing rate (Hz), silent neurons included
    pub fn min_neuron_firing_rate(&self) -> Result<f32> {
        Ok(self.spike_stats()?.min_neuron_firing_rate)
    }

    /// Firing rate per neuron (Hz), indexed by group-local id
    pub fn neuron_firing_rates(&self) -> Result<Vec<f32>> {
        Ok(self.spike_stats()?.neuron_firing_rates.clone())
    }

    /// Per-neuron firing rates in ascending order
    pub fn sorted_neuron_firing_rates(&self) -> Result<Vec<f32>> {
        Ok(self.spike_stats()?.sorted_neuron_firing_rates())
    }

    /// Spike count per neuron, indexed by group-local id
    pub fn neuron_num_spikes(&self) -> Result<Vec<u32>> {
        Ok(self.spike_stats()?.neuron_spike_counts.clone())
    }

    /// Neurons firing within `[min_hz, max_hz]`
    pub fn num_neurons_with_firing_rate(&self, min_hz: f32, max_hz: f32) -> Result<usize> {
        Ok(self.spike_stats()?.num_neurons_with_firing_rate(min_hz, max_hz))
    }

    /// Share of neurons firing within `[min_hz, max_hz]`, in percent
    pub fn percent_neurons_with_firing_rate(&self, min_hz: f32, max_hz: f32) -> Result<f32> {
        Ok(self.spike_stats()?.percent_neurons_with_firing_rate(min_hz, max_hz))
    }

    /// Neurons that did not fire during the window
    pub fn num_silent_neurons(&self) -> Result<usize> {
        Ok(self.spike_stats()?.num_silent_neurons())
    }

    /// Share of silent neurons, in percent
    pub fn percent_silent_neurons(&self) -> Result<f32> {
        Ok(self.spike_stats()?.percent_silent_neurons())
    }

    /// Spikes captured since the buffer was last reset
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    /// Same as [`size`](Self::size)
    pub fn pop_num_spikes(&self) -> usize {
        self.buffer.len()
    }

    /// Copy of the captured spikes in arrival order
    pub fn events(&self) -> Vec<SpikeEvent> {
        self.buffer.to_vec()
    }

    /// Borrow the captured spikes in arrival order
    pub fn events_slice(&self) -> &[SpikeEvent] {
        self.buffer.events()
    }

    /// Keep the buffer across `start_recording` calls when `true`
    pub fn set_persistent(&mut self, persistent: bool) {
        self.persistent = persistent;
    }

    /// Check if the buffer accumulates across windows
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Current recording state
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Check if a window is open
    pub fn is_recording(&self) -> bool {
        self.state == MonitorState::Recording
    }

    /// Start of the window in progress, or of the last closed window
    pub fn recording_start_time_ms(&self) -> Option<i32> {
        self.window_start_ms
            .or_else(|| self.last_window.map(|w| w.start_ms))
    }

    /// Stop time of the last closed window; `None` while recording
    pub fn recording_stop_time_ms(&self) -> Option<i32> {
        match self.state {
            MonitorState::Recording => None,
            MonitorState::Idle => self.last_window.map(|w| w.stop_ms),
        }
    }

    /// Last closed window
    pub fn last_window(&self) -> Option<RecordingWindow> {
        self.last_window
    }

    /// Duration of the last closed window; the rate denominator
    pub fn last_window_duration_ms(&self) -> Option<u32> {
        self.last_window.map(|w| w.duration_ms())
    }

    /// Summed duration of the windows closed since the buffer was last reset
    pub fn total_recording_time_ms(&self) -> u64 {
        self.total_recording_ms
    }

    /// Monitored group
    pub fn group_id(&self) -> usize {
        self.group_id
    }

    /// Neurons in the monitored group
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Spike log location, if the monitor writes one
    pub fn log_path(&self) -> Option<&Path> {
        self.log.as_ref().map(|log| log.path())
    }

    /// Records waiting for the next log append
    pub fn staged_records(&self) -> usize {
        self.staged.len()
    }

    /// Delivery, capture and flush counters
    pub fn monitor_stats(&self) -> MonitorStats {
        self.stats.clone()
    }

    /// Log a one-shot summary of the monitor
    pub fn print_summary(&self) {
        info!(
            "Group {}: state={} persistent={} spikes={} last_window={:?}",
            self.group_id,
            self.state,
            self.persistent,
            self.buffer.len(),
            self.last_window
        );
        match self.spike_stats() {
            Ok(stats) => info!(
                "Group {}: rate={:.3}Hz max={:.3}Hz min={:.3}Hz silent={}/{}",
                self.group_id,
                stats.grp_firing_rate,
                stats.max_neuron_firing_rate,
                stats.min_neuron_firing_rate,
                stats.num_silent_neurons(),
                self.group_size
            ),
            Err(e) => info!("Group {}: no statistics ({})", self.group_id, e),
        }
        if let Some(log) = &self.log {
            info!(
                "Group {}: spike log {:?} +{} records ({} bytes) this session, {} staged",
                self.group_id,
                log.path(),
                log.records_written(),
                log.bytes_written(),
                self.staged.len()
            );
        }
    }
}

impl Drop for GroupMonitor {
    fn drop(&mut self) {
        if let Err(e) = self.flush_log() {
            warn!(
                "Group {}: dropping {} unflushed spike log records: {}",
                self.group_id,
                self.staged.len(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::event_log::read_event_log;
    use tempfile::tempdir;

    fn step(group_size: i32, t: i32) -> Vec<SpikeEvent> {
        (0..group_size).map(|n| SpikeEvent::new(t, n)).collect()
    }

    /// Drive `monitor` over `[from, to)` with every neuron firing every `isi` ms
    fn run(monitor: &mut GroupMonitor, from: i32, to: i32, isi: i32) {
        let size = monitor.group_size() as i32;
        for t in from..to {
            if t % isi == 0 {
                monitor.ingest(&step(size, t)).unwrap();
            }
        }
    }

    fn monitor(group_size: usize, path: Option<&Path>) -> GroupMonitor {
        GroupMonitor::new(0, group_size, path, &MonitorConfig::default()).unwrap()
    }

    #[test]
    fn test_monitor_creation() {
        let m = monitor(3, None);
        assert_eq!(m.state(), MonitorState::Idle);
        assert_eq!(m.size(), 0);
        assert!(m.log_path().is_none());
    }

    #[test]
    fn test_zero_group_size_rejected() {
        let result = GroupMonitor::new(4, 0, None, &MonitorConfig::default());
        assert!(matches!(result, Err(MonitorError::InvalidGroupSize { group_id: 4 })));
    }

    #[test]
    fn test_unwritable_log_fails_at_creation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absentDirectory/testSpikes.dat");
        let result = GroupMonitor::new(0, 10, Some(path.as_path()), &MonitorConfig::default());
        assert!(matches!(result, Err(MonitorError::LogOpen { .. })));
    }

    #[test]
    fn test_state_transitions() {
        let mut m = monitor(2, None);

        assert!(matches!(m.stop_recording(0), Err(MonitorError::NotRecording { .. })));
        m.start_recording(0).unwrap();
        assert!(m.is_recording());
        assert!(matches!(m.start_recording(5), Err(MonitorError::AlreadyRecording { .. })));
        // The failed start did not move the window
        assert_eq!(m.recording_start_time_ms(), Some(0));

        m.stop_recording(10).unwrap();
        assert!(!m.is_recording());
        assert_eq!(m.last_window_duration_ms(), Some(10));
        assert_eq!(m.recording_stop_time_ms(), Some(10));
    }

    #[test]
    fn test_idle_events_not_captured() {
        let mut m = monitor(2, None);
        assert_eq!(m.ingest(&step(2, 0)).unwrap(), 0);
        assert_eq!(m.size(), 0);
        assert_eq!(m.monitor_stats().events_delivered, 2);
    }

    #[test]
    fn test_rates_fail_while_recording() {
        let mut m = monitor(2, None);
        m.start_recording(0).unwrap();
        run(&mut m, 0, 1000, 100);

        assert!(matches!(m.grp_firing_rate(), Err(MonitorError::StillRecording { .. })));
        assert!(matches!(m.max_neuron_firing_rate(), Err(MonitorError::StillRecording { .. })));
        assert!(matches!(m.min_neuron_firing_rate(), Err(MonitorError::StillRecording { .. })));
    }

    #[test]
    fn test_rates_before_any_window() {
        let m = monitor(2, None);
        assert!(matches!(m.grp_firing_rate(), Err(MonitorError::NoRecordingWindow { .. })));
    }

    #[test]
    fn test_window_rate() {
        let mut m = monitor(3, None);
        m.start_recording(0).unwrap();
        run(&mut m, 0, 2500, 100);
        m.stop_recording(2500).unwrap();

        assert_eq!(m.size(), 75);
        assert!((m.grp_firing_rate().unwrap() - 10.0).abs() < 1e-4);
        assert!(m.events().iter().all(|e| e.time_ms % 100 == 0));
    }

    #[test]
    fn test_log_holds_full_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spikes.dat");
        let mut m = monitor(2, Some(path.as_path()));

        run(&mut m, 0, 500, 100);
        m.start_recording(500).unwrap();
        run(&mut m, 500, 1500, 100);
        m.stop_recording(1500).unwrap();
        run(&mut m, 1500, 2000, 100);
        m.flush_log().unwrap();

        assert_eq!(m.size(), 20);
        assert!((m.grp_firing_rate().unwrap() - 10.0).abs() < 1e-4);
        assert_eq!(read_event_log(&path).unwrap().len(), 40);
        m.print_summary();
    }

    #[test]
    fn test_drop_flushes_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spikes.dat");
        {
            let mut m = monitor(2, Some(path.as_path()));
            run(&mut m, 0, 300, 100);
            assert_eq!(m.staged_records(), 6);
        }
        assert_eq!(read_event_log(&path).unwrap().len(), 6);
    }

    #[test]
    fn test_flush_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spikes.dat");
        let config = MonitorConfig {
            log_flush_threshold: 4,
            ..Default::default()
        };
        let mut m = GroupMonitor::new(0, 2, Some(path.as_path()), &config).unwrap();

        m.ingest(&step(2, 0)).unwrap();
        assert_eq!(m.staged_records(), 2);
        m.ingest(&step(2, 1)).unwrap();
        assert_eq!(m.staged_records(), 0);
        assert_eq!(read_event_log(&path).unwrap().len(), 4);
    }

    #[test]
    fn test_clear_keeps_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spikes.dat");
        let mut m = monitor(2, Some(path.as_path()));

        m.start_recording(0).unwrap();
        run(&mut m, 0, 1000, 100);
        m.stop_recording(1000).unwrap();
        assert!(m.size() > 0);

        m.clear();
        assert_eq!(m.size(), 0);
        assert!(matches!(
            m.grp_firing_rate(),
            Err(MonitorError::NoRecordingWindow { group_id: 0 })
        ));
        assert_eq!(read_event_log(&path).unwrap().len(), 20);
    }

    #[test]
    fn test_non_persistent_start_resets_buffer() {
        let mut m = monitor(1, None);
        m.start_recording(0).unwrap();
        run(&mut m, 0, 1000, 100);
        m.stop_recording(1000).unwrap();

        m.start_recording(1000).unwrap();
        run(&mut m, 1000, 1500, 100);
        m.stop_recording(1500).unwrap();

        assert_eq!(m.size(), 5);
        assert!((m.grp_firing_rate().unwrap() - 10.0).abs() < 1e-4);
        assert_eq!(m.total_recording_time_ms(), 500);
    }

    #[test]
    fn test_persistent_accumulates_with_last_window_duration() {
        let mut m = monitor(1, None);
        m.set_persistent(true);

        m.start_recording(0).unwrap();
        run(&mut m, 0, 1000, 100);
        m.stop_recording(1000).unwrap();

        m.start_recording(1000).unwrap();
        run(&mut m, 1000, 1500, 100);
        m.stop_recording(1500).unwrap();

        // 15 spikes over the last 500ms window only
        assert_eq!(m.size(), 15);
        assert!((m.grp_firing_rate().unwrap() - 30.0).abs() < 1e-3);
        assert_eq!(m.total_recording_time_ms(), 1500);
    }

    #[test]
    fn test_rejects_bad_batches_atomically() {
        let mut m = monitor(2, None);
        m.start_recording(0).unwrap();

        let bad_id = [SpikeEvent::new(0, 0), SpikeEvent::new(0, 2)];
        assert!(matches!(m.ingest(&bad_id), Err(MonitorError::NeuronOutOfRange { .. })));
        assert_eq!(m.size(), 0);

        m.ingest(&[SpikeEvent::new(5, 0)]).unwrap();
        let backwards = [SpikeEvent::new(4, 1)];
        assert!(matches!(m.ingest(&backwards), Err(MonitorError::NonMonotonicTime { .. })));
        assert_eq!(m.size(), 1);
    }

    #[test]
    fn test_spikes_before_window_not_captured() {
        let mut m = monitor(2, None);
        m.ingest(&[SpikeEvent::new(3, 0)]).unwrap();
        m.start_recording(10).unwrap();

        let late = [SpikeEvent::new(8, 1), SpikeEvent::new(10, 0), SpikeEvent::new(10, 1)];
        assert_eq!(m.ingest(&late).unwrap(), 2);
        assert!(m.events().iter().all(|e| e.time_ms >= 10));
    }

    #[test]
    fn test_spikes_after_window_stop_discarded() {
        let mut m = monitor(2, None);
        m.start_recording(0).unwrap();
        m.ingest(&[SpikeEvent::new(0, 0), SpikeEvent::new(5000, 0)]).unwrap();
        m.stop_recording(1000).unwrap();

        assert_eq!(m.size(), 1);
        assert!(m.events().iter().all(|e| e.time_ms < 1000));
        assert!((m.grp_firing_rate().unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(m.monitor_stats().events_captured, 1);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_flush_at_stop() {
        // Every write to /dev/full fails with ENOSPC
        let mut m = monitor(2, Some(Path::new("/dev/full")));
        m.start_recording(0).unwrap();
        run(&mut m, 0, 1000, 100);

        let result = m.stop_recording(1000);
        assert!(matches!(result, Err(MonitorError::LogWrite { .. })));
        assert!(!result.unwrap_err().is_usage_error());

        // The window is closed and its statistics are available
        assert_eq!(m.state(), MonitorState::Idle);
        assert_eq!(m.last_window_duration_ms(), Some(1000));
        assert!((m.grp_firing_rate().unwrap() - 10.0).abs() < 1e-4);

        // Nothing was lost: the records wait for the next flush
        assert_eq!(m.staged_records(), 20);
        assert_eq!(m.monitor_stats().log_flushes, 0);
        assert!(m.flush_log().is_err());
        assert_eq!(m.staged_records(), 20);
    }

    #[test]
    fn test_zero_length_window() {
        let mut m = monitor(2, None);
        m.start_recording(7).unwrap();
        m.stop_recording(7).unwrap();
        assert_eq!(m.grp_firing_rate().unwrap(), 0.0);
        assert_eq!(m.max_neuron_firing_rate().unwrap(), 0.0);
    }
}
