// src/recording/statistics.rs
//! Firing-rate statistics over a set of captured spikes
//!
//! Rates are spikes per second per neuron. All `group_size` neurons take part in the
//! per-neuron figures, including those that never fired.

use crate::recording::event::SpikeEvent;
use serde::Serialize;

/// Statistics computed from `(events, group_size, duration_ms)`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpikeStats {
    /// Neurons in the group
    pub group_size: usize,

    /// Rate denominator (milliseconds)
    pub duration_ms: u32,

    /// Spikes counted
    pub total_spikes: usize,

    /// Spike count per neuron, indexed by group-local id
    pub neuron_spike_counts: Vec<u32>,

    /// Firing rate per neuron (Hz), indexed by group-local id
    pub neuron_firing_rates: Vec<f32>,

    /// Mean firing rate of the group (Hz)
    pub grp_firing_rate: f32,

    pub max_neuron_firing_rate: f32,
    pub min_neuron_firing_rate: f32,
}

impl SpikeStats {
    /// Compute statistics for `events` over a window of `duration_ms`
    ///
    /// A zero-length window yields all-zero rates. Events whose neuron id falls
    /// outside `[0, group_size)` are not counted.
    pub fn compute(events: &[SpikeEvent], group_size: usize, duration_ms: u32) -> Self {
        let mut counts = vec![0u32; group_size];
        let mut total_spikes = 0;
        for event in events {
            if let Some(count) = usize::try_from(event.neuron_id)
                .ok()
                .and_then(|idx| counts.get_mut(idx))
            {
                *count += 1;
                total_spikes += 1;
            }
        }

        let seconds = duration_ms as f32 / 1000.0;
        let rate = |spikes: f32, neurons: f32| {
            if duration_ms == 0 || neurons == 0.0 {
                0.0
            } else {
                spikes / (neurons * seconds)
            }
        };

        let neuron_firing_rates: Vec<f32> = counts.iter().map(|&c| rate(c as f32, 1.0)).collect();
        let grp_firing_rate = rate(total_spikes as f32, group_size as f32);

        let max_neuron_firing_rate = neuron_firing_rates
            .iter()
            .copied()
            .fold(None, |acc: Option<f32>, r| Some(acc.map_or(r, |m| m.max(r))))
            .unwrap_or(0.0);
        let min_neuron_firing_rate = neuron_firing_rates
            .iter()
            .copied()
            .fold(None, |acc: Option<f32>, r| Some(acc.map_or(r, |m| m.min(r))))
            .unwrap_or(0.0);

        Self {
            group_size,
            duration_ms,
            total_spikes,
            neuron_spike_counts: counts,
            neuron_firing_rates,
            grp_firing_rate,
            max_neuron_firing_rate,
            min_neuron_firing_rate,
        }
    }

    /// Per-neuron rates in ascending order
    pub fn sorted_neuron_firing_rates(&self) -> Vec<f32> {
        let mut rates = self.neuron_firing_rates.clone();
        rates.sort_by(|a, b| a.total_cmp(b));
        rates
    }

    /// Neurons whose rate lies in `[min_hz, max_hz]`
    pub fn num_neurons_with_firing_rate(&self, min_hz: f32, max_hz: f32) -> usize {
        self.neuron_firing_rates
            .iter()
            .filter(|&&r| r >= min_hz && r <= max_hz)
            .count()
    }

    /// Percentage of neurons whose rate lies in `[min_hz, max_hz]`
    pub fn percent_neurons_with_firing_rate(&self, min_hz: f32, max_hz: f32) -> f32 {
        percent(self.num_neurons_with_firing_rate(min_hz, max_hz), self.group_size)
    }

    /// Neurons that never fired
    pub fn num_silent_neurons(&self) -> usize {
        self.neuron_spike_counts.iter().filter(|&&c| c == 0).count()
    }

    pub fn percent_silent_neurons(&self) -> f32 {
        percent(self.num_silent_neurons(), self.group_size)
    }
}

fn percent(part: usize, whole: usize) -> f32 {
    if whole == 0 {
        0.0
    } else {
        part as f32 * 100.0 / whole as f32
    }
}
