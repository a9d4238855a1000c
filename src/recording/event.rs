// src/recording/event.rs
//! Address-event representation of a spike

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of one spike log record: `i32` time followed by `i32` neuron id
pub const RECORD_SIZE: usize = 8;

/// A single spike: neuron `neuron_id` (group-local) fired at `time_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpikeEvent {
    /// Simulation time (milliseconds)
    pub time_ms: i32,

    /// Group-local neuron index
    pub neuron_id: i32,
}

impl SpikeEvent {
    pub const fn new(time_ms: i32, neuron_id: i32) -> Self {
        Self { time_ms, neuron_id }
    }

    /// Native-endian log record
    pub fn to_ne_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut record = [0u8; RECORD_SIZE];
        record[..4].copy_from_slice(&self.time_ms.to_ne_bytes());
        record[4..].copy_from_slice(&self.neuron_id.to_ne_bytes());
        record
    }

    /// Decode a native-endian log record
    pub fn from_ne_bytes(record: [u8; RECORD_SIZE]) -> Self {
        let time_ms = i32::from_ne_bytes([record[0], record[1], record[2], record[3]]);
        let neuron_id = i32::from_ne_bytes([record[4], record[5], record[6], record[7]]);
        Self { time_ms, neuron_id }
    }
}

impl fmt::Display for SpikeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "time = {}, nid = {}", self.time_ms, self.neuron_id)
    }
}
