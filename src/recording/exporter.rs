// src/recording/exporter.rs
//! Export captured spikes to text formats
//!
//! Supports:
//! - JSON (spike list plus export metadata)
//! - CSV (`time_ms,neuron_id` rows)
//! - Text (`time = T, nid = N` lines, the classic spike-file dump)

use crate::recording::event::SpikeEvent;
use crate::utils::errors::{MonitorError, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

/// Export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

/// Exporter for captured spikes
pub struct Exporter {
    format: ExportFormat,
}

impl Exporter {
    /// Create a new exporter
    pub fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// Export events to string
    pub fn export(&self, events: &[SpikeEvent]) -> Result<String> {
        debug!("Exporting {} spikes to {:?} format", events.len(), self.format);

        match self.format {
            ExportFormat::Json => self.export_json(events),
            ExportFormat::Csv => Ok(self.export_csv(events)),
            ExportFormat::Text => Ok(self.export_text(events)),
        }
    }

    /// Export events into a file at `path`, replacing it
    pub fn export_to_file<P: AsRef<Path>>(&self, events: &[SpikeEvent], path: P) -> Result<()> {
        let rendered = self.export(events)?;
        std::fs::write(path.as_ref(), rendered).map_err(|e| {
            MonitorError::ExportFailed(format!("failed to write {:?}: {}", path.as_ref(), e))
        })
    }

    fn export_json(&self, events: &[SpikeEvent]) -> Result<String> {
        let document = SpikeDocument {
            exported_at: chrono::Utc::now().to_rfc3339(),
            exporter_version: env!("CARGO_PKG_VERSION"),
            event_count: events.len(),
            events,
        };

        serde_json::to_string_pretty(&document).map_err(|e| {
            MonitorError::ExportFailed(format!("JSON serialization error: {}", e))
        })
    }

    fn export_csv(&self, events: &[SpikeEvent]) -> String {
        let mut out = String::with_capacity(16 + events.len() * 12);
        out.push_str("time_ms,neuron_id\n");
        for event in events {
            // Writing to a String cannot fail
            let _ = writeln!(out, "{},{}", event.time_ms, event.neuron_id);
        }
        out
    }

    fn export_text(&self, events: &[SpikeEvent]) -> String {
        let mut out = String::with_capacity(events.len() * 24);
        for event in events {
            let _ = writeln!(out, "{}", event);
        }
        out
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(ExportFormat::Json)
    }
}

#[derive(Serialize)]
struct SpikeDocument<'a> {
    exported_at: String,
    exporter_version: &'static str,
    event_count: usize,
    events: &'a [SpikeEvent],
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<SpikeEvent> {
        vec![SpikeEvent::new(0, 1), SpikeEvent::new(100, 0)]
    }

    #[test]
    fn test_export_json() {
        let json = Exporter::new(ExportFormat::Json).export(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["event_count"], 2);
        assert_eq!(value["events"][1]["time_ms"], 100);
        assert_eq!(value["events"][0]["neuron_id"], 1);
    }

    #[test]
    fn test_export_csv() {
        let csv = Exporter::new(ExportFormat::Csv).export(&sample()).unwrap();
        assert_eq!(csv, "time_ms,neuron_id\n0,1\n100,0\n");
    }

    #[test]
    fn test_export_text() {
        let text = Exporter::new(ExportFormat::Text).export(&sample()).unwrap();
        assert_eq!(text, "time = 0, nid = 1\ntime = 100, nid = 0\n");
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spikes.csv");
        Exporter::new(ExportFormat::Csv)
            .export_to_file(&sample(), &path)
            .unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("time_ms"));
    }
}
