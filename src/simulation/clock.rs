// src/simulation/clock.rs
//! Shared simulation clock
//!
//! Monitor handles read the clock to timestamp `start_recording`/`stop_recording`,
//! so it is shared between the simulator and every handle it gives out.

use std::sync::atomic::{AtomicI32, Ordering};

/// Simulated time in milliseconds
#[derive(Debug, Default)]
pub struct SimClock {
    now_ms: AtomicI32,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time (ms)
    pub fn now_ms(&self) -> i32 {
        self.now_ms.load(Ordering::Acquire)
    }

    /// Advance by `ms` and return the new time
    pub fn advance(&self, ms: i32) -> i32 {
        self.now_ms.fetch_add(ms, Ordering::AcqRel) + ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let clock = SimClock::new();
        assert_eq!(clock.now_ms(), 0);
        assert_eq!(clock.advance(1), 1);
        assert_eq!(clock.advance(99), 100);
        assert_eq!(clock.now_ms(), 100);
    }
}
