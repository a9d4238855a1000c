// src/simulation/generator.rs
//! Spike sources for generator groups
//!
//! - **Periodic**: every neuron fires at `t % isi == 0`, `isi = floor(1000 / rate)`
//! - **Poisson**: each neuron fires in a 1ms step with probability `rate / 1000`

use crate::recording::event::SpikeEvent;
use crate::utils::errors::{MonitorError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the spikes of a generator group, one simulation step at a time
pub trait SpikeGenerator: Send {
    /// Append the spikes emitted at `time_ms` by a group of `group_size` neurons
    fn spikes_at(&mut self, time_ms: i32, group_size: usize, out: &mut Vec<SpikeEvent>);
}

fn check_rate(rate_hz: f64) -> Result<()> {
    if rate_hz.is_finite() && rate_hz > 0.0 && rate_hz <= 1000.0 {
        Ok(())
    } else {
        Err(MonitorError::InvalidRate(rate_hz))
    }
}

/// Fires every neuron in lockstep at a fixed inter-spike interval
#[derive(Debug, Clone)]
pub struct PeriodicSpikeGenerator {
    rate_hz: f64,
    isi_ms: i32,
}

impl PeriodicSpikeGenerator {
    pub fn new(rate_hz: f64) -> Result<Self> {
        check_rate(rate_hz)?;
        let isi_ms = (1000.0 / rate_hz).floor() as i32;
        Ok(Self { rate_hz, isi_ms })
    }

    pub fn rate_hz(&self) -> f64 {
        self.rate_hz
    }

    /// Inter-spike interval (ms)
    pub fn isi_ms(&self) -> i32 {
        self.isi_ms
    }
}

impl SpikeGenerator for PeriodicSpikeGenerator {
    fn spikes_at(&mut self, time_ms: i32, group_size: usize, out: &mut Vec<SpikeEvent>) {
        if time_ms % self.isi_ms == 0 {
            out.extend((0..group_size as i32).map(|n| SpikeEvent::new(time_ms, n)));
        }
    }
}

/// Independent Bernoulli spiking per neuron and step
#[derive(Debug, Clone)]
pub struct PoissonSpikeGenerator {
    rates_hz: Vec<f64>,
    rng: StdRng,
}

impl PoissonSpikeGenerator {
    /// One rate per neuron; neurons beyond `rates_hz.len()` stay silent
    pub fn new(rates_hz: Vec<f64>, seed: u64) -> Result<Self> {
        for &rate in &rates_hz {
            if rate != 0.0 {
                check_rate(rate)?;
            }
        }
        Ok(Self {
            rates_hz,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Same rate for all `group_size` neurons
    pub fn uniform(group_size: usize, rate_hz: f64, seed: u64) -> Result<Self> {
        Self::new(vec![rate_hz; group_size], seed)
    }

    pub fn rates_hz(&self) -> &[f64] {
        &self.rates_hz
    }
}

impl SpikeGenerator for PoissonSpikeGenerator {
    fn spikes_at(&mut self, time_ms: i32, group_size: usize, out: &mut Vec<SpikeEvent>) {
        for (n, &rate) in self.rates_hz.iter().take(group_size).enumerate() {
            if rate > 0.0 && self.rng.gen::<f64>() < rate / 1000.0 {
                out.push(SpikeEvent::new(time_ms, n as i32));
            }
        }
    }
}
