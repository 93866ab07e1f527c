//! Threshold state machine.
//!
//! Converts a stream of raw pass/fail outcomes into debounced status
//! transitions. Emission is edge-triggered: a status is produced exactly
//! when a counter reaches its threshold, never again while it saturates.

use crate::probe::ProbeStatus;

/// Saturating consecutive-outcome counters for one probe session.
///
/// Both counters are clamped to `threshold + 1` so a long run of identical
/// outcomes keeps the counter saturated one past the edge instead of
/// growing without bound. A single contrary outcome resets the opposite
/// counter to zero, restarting its climb from scratch.
#[derive(Debug)]
pub struct StatusTracker {
    success_threshold: u32,
    failure_threshold: u32,
    consecutive_successes: u32,
    consecutive_failures: u32,
}

impl StatusTracker {
    /// Create a tracker with both counters at zero.
    pub fn new(success_threshold: u32, failure_threshold: u32) -> Self {
        Self {
            success_threshold,
            failure_threshold,
            consecutive_successes: 0,
            consecutive_failures: 0,
        }
    }

    /// Record one outcome; returns a status only on a threshold edge.
    pub fn record(&mut self, success: bool) -> Option<ProbeStatus> {
        if success {
            self.consecutive_successes =
                (self.consecutive_successes + 1).min(self.success_threshold + 1);
            self.consecutive_failures = 0;

            (self.consecutive_successes == self.success_threshold)
                .then_some(ProbeStatus::Healthy)
        } else {
            self.consecutive_failures =
                (self.consecutive_failures + 1).min(self.failure_threshold + 1);
            self.consecutive_successes = 0;

            (self.consecutive_failures == self.failure_threshold)
                .then_some(ProbeStatus::Unhealthy)
        }
    }

    /// Current run of consecutive passes.
    pub fn consecutive_successes(&self) -> u32 {
        self.consecutive_successes
    }

    /// Current run of consecutive failures.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
