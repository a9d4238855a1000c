// src/simulation/simulator.rs
//! Minimal stepping simulator driving the spike monitors
//!
//! Neuron dynamics are not modelled here. Generator groups produce spikes from their
//! [`SpikeGenerator`]; any other group receives spikes from an external integrator
//! through [`Simulator::deliver_events`]. Each 1ms step delivers exactly one batch per
//! monitored group, in group order.

use crate::recording::event::SpikeEvent;
use crate::recording::monitor::GroupMonitor;
use crate::simulation::clock::SimClock;
use crate::simulation::generator::SpikeGenerator;
use crate::simulation::registry::{MonitorRegistry, SpikeMonitor};
use crate::utils::config::MonitorConfig;
use crate::utils::errors::{MonitorError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, info_span};
use ulid::Ulid;

/// How a group obtains its spikes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Spikes come from an attached generator
    SpikeGenerator,
    /// Spikes are delivered from outside
    External,
}

struct Group {
    name: String,
    size: usize,
    kind: GroupKind,
    generator: Option<Box<dyn SpikeGenerator>>,
}

/// Simulation run owning groups, the clock and the monitor registry
pub struct Simulator {
    name: String,
    run_id: Ulid,
    clock: Arc<SimClock>,
    groups: Vec<Group>,
    monitors: MonitorRegistry,
    config: MonitorConfig,
    scratch: Vec<SpikeEvent>,
}

impl Simulator {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, MonitorConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: MonitorConfig) -> Self {
        let name = name.into();
        let run_id = Ulid::new();
        info!("Created simulator {} (run {})", name, run_id);

        Self {
            name,
            run_id,
            clock: Arc::new(SimClock::new()),
            groups: Vec::new(),
            monitors: MonitorRegistry::new(),
            config,
            scratch: Vec::new(),
        }
    }

    fn add_group(&mut self, name: &str, size: usize, kind: GroupKind) -> Result<usize> {
        let group_id = self.groups.len();
        if size == 0 {
            return Err(MonitorError::InvalidGroupSize { group_id });
        }
        self.groups.push(Group {
            name: name.to_string(),
            size,
            kind,
            generator: None,
        });
        debug!("Created {:?} group {} ({}, {} neurons)", kind, group_id, name, size);
        Ok(group_id)
    }

    /// Add a group whose spikes come from a generator
    pub fn create_spike_generator_group(&mut self, name: &str, size: usize) -> Result<usize> {
        self.add_group(name, size, GroupKind::SpikeGenerator)
    }

    /// Add a group fed through [`deliver_events`](Self::deliver_events)
    pub fn create_group(&mut self, name: &str, size: usize) -> Result<usize> {
        self.add_group(name, size, GroupKind::External)
    }

    fn group(&self, group_id: usize) -> Result<&Group> {
        self.groups
            .get(group_id)
            .ok_or(MonitorError::InvalidGroup(group_id))
    }

    /// Attach a generator to a generator group, replacing any previous one
    pub fn set_spike_generator(
        &mut self,
        group_id: usize,
        generator: Box<dyn SpikeGenerator>,
    ) -> Result<()> {
        let group = self
            .groups
            .get_mut(group_id)
            .ok_or(MonitorError::InvalidGroup(group_id))?;
        if group.kind != GroupKind::SpikeGenerator {
            return Err(MonitorError::InvalidGroup(group_id));
        }
        group.generator = Some(generator);
        Ok(())
    }

    /// Create the spike monitor of `group_id`, optionally backed by a spike log
    pub fn set_spike_monitor(
        &mut self,
        group_id: usize,
        log_path: Option<&Path>,
    ) -> Result<SpikeMonitor> {
        let size = self.group(group_id)?.size;
        if self.monitors.contains(group_id) {
            return Err(MonitorError::DuplicateMonitor(group_id));
        }

        let monitor = GroupMonitor::new(group_id, size, log_path, &self.config)?;
        self.monitors
            .insert(SpikeMonitor::new(monitor, Arc::clone(&self.clock)))
    }

    pub fn spike_monitor(&self, group_id: usize) -> Option<SpikeMonitor> {
        self.monitors.get(group_id).cloned()
    }

    /// Detach the monitor of `group_id`
    pub fn remove_spike_monitor(&mut self, group_id: usize) -> Result<()> {
        self.monitors.remove(group_id).map(|_| ())
    }

    /// Hand one step's spikes of `group_id` to its monitor, if any
    ///
    /// Returns the number of spikes captured into the monitor's buffer. Spikes stamped
    /// later than the current simulation time are rejected with the whole batch.
    pub fn deliver_events(&self, group_id: usize, events: &[SpikeEvent]) -> Result<usize> {
        self.group(group_id)?;
        let now_ms = self.clock.now_ms();
        if let Some(event) = events.iter().find(|e| e.time_ms > now_ms) {
            return Err(MonitorError::FutureSpike {
                group_id,
                time_ms: event.time_ms,
                now_ms,
            });
        }
        match self.monitors.get(group_id) {
            Some(monitor) => monitor.ingest(events),
            None => Ok(0),
        }
    }

    /// Advance the simulation by one millisecond
    pub fn step(&mut self) -> Result<()> {
        let now_ms = self.clock.now_ms();

        for group_id in 0..self.groups.len() {
            let group = &mut self.groups[group_id];
            let Some(generator) = group.generator.as_mut() else {
                continue;
            };

            self.scratch.clear();
            generator.spikes_at(now_ms, group.size, &mut self.scratch);
            if self.scratch.is_empty() {
                continue;
            }

            if let Some(monitor) = self.monitors.get(group_id) {
                monitor.ingest(&self.scratch)?;
            }
        }

        self.clock.advance(1);
        Ok(())
    }

    /// Run for `seconds` s plus `millis` ms, then flush every spike log
    pub fn run_network(&mut self, seconds: u32, millis: u32) -> Result<()> {
        let steps = seconds as u64 * 1000 + millis as u64;
        let span = info_span!("run_network", run_id = %self.run_id, sim = %self.name);
        let _enter = span.enter();

        debug!("Running {} steps from {}ms", steps, self.clock.now_ms());
        for _ in 0..steps {
            self.step()?;
        }
        self.flush_monitors()?;

        debug!("Run finished at {}ms", self.clock.now_ms());
        Ok(())
    }

    /// Append every monitor's staged records to its spike log
    pub fn flush_monitors(&self) -> Result<usize> {
        self.monitors.flush_all()
    }

    /// Current simulation time (ms)
    pub fn sim_time_ms(&self) -> i32 {
        self.clock.now_ms()
    }

    pub fn clock(&self) -> Arc<SimClock> {
        Arc::clone(&self.clock)
    }

    pub fn run_id(&self) -> Ulid {
        self.run_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn group_size(&self, group_id: usize) -> Result<usize> {
        Ok(self.group(group_id)?.size)
    }

    pub fn group_name(&self, group_id: usize) -> Result<&str> {
        Ok(&self.group(group_id)?.name)
    }

    pub fn group_kind(&self, group_id: usize) -> Result<GroupKind> {
        Ok(self.group(group_id)?.kind)
    }

    pub fn monitors(&self) -> &MonitorRegistry {
        &self.monitors
    }
}
