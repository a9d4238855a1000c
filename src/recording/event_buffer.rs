// src/recording/event_buffer.rs
//! In-memory spike buffer
//!
//! Holds the events captured while a monitor is recording, in arrival order.
//! Arrival order is simulation order, so the buffer is time-sorted; it never
//! reorders or deduplicates.

use crate::recording::event::SpikeEvent;

/// Ordered, growable spike buffer
#[derive(Debug, Default)]
pub struct EventBuffer {
    /// Captured events, oldest first
    events: Vec<SpikeEvent>,
}

impl EventBuffer {
    /// Create a buffer with room for `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
        }
    }

    /// Append a step's worth of events, preserving their order
    pub fn extend_from_slice(&mut self, events: &[SpikeEvent]) {
        self.events.extend_from_slice(events);
    }

    /// Borrow the captured events in insertion order
    pub fn events(&self) -> &[SpikeEvent] {
        &self.events
    }

    /// Copy of the captured events in insertion order
    pub fn to_vec(&self) -> Vec<SpikeEvent> {
        self.events.clone()
    }

    /// Drop every event stamped at or after `time_ms`
    ///
    /// Returns the number of events removed.
    pub fn truncate_from(&mut self, time_ms: i32) -> usize {
        let keep = self.events.partition_point(|e| e.time_ms < time_ms);
        let removed = self.events.len() - keep;
        self.events.truncate(keep);
        removed
    }

    /// Drop all events, keeping the allocation
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of captured events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Allocated capacity (events)
    pub fn capacity(&self) -> usize {
        self.events.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = EventBuffer::new(16);
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert!(buffer.capacity() >= 16);
    }

    #[test]
    fn test_preserves_insertion_order() {
        let mut buffer = EventBuffer::new(4);
        buffer.extend_from_slice(&[SpikeEvent::new(0, 1), SpikeEvent::new(0, 0)]);
        buffer.extend_from_slice(&[SpikeEvent::new(5, 1), SpikeEvent::new(5, 1)]);

        let ids: Vec<i32> = buffer.events().iter().map(|e| e.neuron_id).collect();
        assert_eq!(ids, vec![1, 0, 1, 1]);
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn test_truncate_from() {
        let mut buffer = EventBuffer::new(4);
        buffer.extend_from_slice(&[
            SpikeEvent::new(1, 0),
            SpikeEvent::new(9, 0),
            SpikeEvent::new(10, 1),
            SpikeEvent::new(40, 0),
        ]);

        assert_eq!(buffer.truncate_from(10), 2);
        assert_eq!(buffer.to_vec(), vec![SpikeEvent::new(1, 0), SpikeEvent::new(9, 0)]);
        assert_eq!(buffer.truncate_from(100), 0);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_clear_keeps_allocation() {
        let mut buffer = EventBuffer::new(4);
        buffer.extend_from_slice(&[SpikeEvent::new(1, 0), SpikeEvent::new(2, 0)]);
        let capacity = buffer.capacity();
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn test_to_vec_is_a_copy() {
        let mut buffer = EventBuffer::new(2);
        buffer.extend_from_slice(&[SpikeEvent::new(3, 0)]);
        let copy = buffer.to_vec();
        buffer.clear();

        assert_eq!(copy, vec![SpikeEvent::new(3, 0)]);
        assert!(buffer.is_empty());
    }
}
