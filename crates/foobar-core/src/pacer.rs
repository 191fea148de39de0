//! Real-time pacing between ticks.
//!
//! The simulation itself is instantaneous. A [`TickPacer`] is called once
//! before each tick increment so a terminal run can be watched; tests use
//! [`NoPacing`].

use std::time::Duration;

/// Wall-clock delay applied between two ticks.
pub trait TickPacer {
    /// Wait before the next tick.
    fn pace(&mut self);
}

/// Run ticks back to back.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl TickPacer for NoPacing {
    fn pace(&mut self) {}
}

/// Block the thread for a fixed interval between ticks.
#[derive(Debug, Clone, Copy)]
pub struct SleepPacer {
    interval: Duration,
}

impl SleepPacer {
    /// Pace ticks `interval_ms` milliseconds apart.
    pub const fn from_millis(interval_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms),
        }
    }

    /// The configured delay.
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl TickPacer for SleepPacer {
    fn pace(&mut self) {
        if !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }
    }
}

/// Pick the pacer for a configured interval; 0 disables pacing.
pub fn pacer_for(interval_ms: u64) -> Box<dyn TickPacer> {
    if interval_ms == 0 {
        Box::new(NoPacing)
    } else {
        Box::new(SleepPacer::from_millis(interval_ms))
    }
}
