// src/main.rs
//! Spike monitor scenario runner
//!
//! Drives a periodic generator group through an off/on/off recording cycle, writes
//! the group's spike log and reports the window statistics.

use anyhow::{Context, Result};
use spikemon::observability::{init_metrics, init_tracing, render_metrics};
use spikemon::utils::config::EngineConfig;
use spikemon::{BuildInfo, EventLogReader, PeriodicSpikeGenerator, Simulator};
use tracing::info;

fn main() -> Result<()> {
    // Load configuration
    let config = EngineConfig::load()?;

    // Initialize observability (tracing, metrics)
    init_tracing(&config.logging)?;
    init_metrics()?;

    info!("Starting spikemon v{} ({})", spikemon::VERSION, spikemon::GIT_HASH);
    info!("Build: {}", serde_json::to_string(&BuildInfo::current())?);
    info!("Configuration loaded: {:?}", config);

    let scenario = &config.scenario;
    std::fs::create_dir_all(&scenario.output_dir).with_context(|| {
        format!("failed to create output directory {:?}", scenario.output_dir)
    })?;
    let log_path = scenario.output_dir.join("spikes_input.dat");

    let mut sim = Simulator::with_config("spikemon", config.monitor.clone());
    let input = sim.create_spike_generator_group("input", scenario.group_size)?;
    sim.set_spike_generator(
        input,
        Box::new(PeriodicSpikeGenerator::new(scenario.rate_hz)?),
    )?;
    let monitor = sim.set_spike_monitor(input, Some(log_path.as_path()))?;

    let (off_s, off_ms) = (scenario.off_ms / 1000, scenario.off_ms % 1000);
    let (on_s, on_ms) = (scenario.on_ms / 1000, scenario.on_ms % 1000);

    sim.run_network(off_s, off_ms)?;
    monitor.start_recording()?;
    sim.run_network(on_s, on_ms)?;
    monitor.stop_recording()?;
    sim.run_network(off_s, off_ms)?;

    monitor.print_summary();

    let stats = monitor.spike_stats()?;
    let logged = EventLogReader::open(&log_path)?.len();
    info!(
        "Window: {} spikes, {:.3}Hz group rate, [{:.3}, {:.3}]Hz per-neuron range",
        stats.total_spikes,
        stats.grp_firing_rate,
        stats.min_neuron_firing_rate,
        stats.max_neuron_firing_rate
    );
    info!("Spike log {:?}: {} records", log_path, logged);

    if let Some(metrics) = render_metrics() {
        info!("Metrics:\n{}", metrics);
    }

    Ok(())
}
