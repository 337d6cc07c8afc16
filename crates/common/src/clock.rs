//! Clock and throttling utilities for the frame tick source.
//!
//! Ticks arrive from an external refresh callback (a display vsync, a
//! camera callback, or a replayed session) carrying millisecond timestamps.
//! This module provides:
//! - A session clock for producing those timestamps live
//! - A throttle that admits at most one cycle per interval

use std::time::Instant;

/// Monotonic millisecond clock anchored at session start.
#[derive(Debug, Clone)]
pub struct SessionClock {
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Milliseconds elapsed since the clock started.
    pub fn elapsed_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Seconds elapsed since the clock started.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Admits at most one run per interval, dropping everything in between.
///
/// A tick is due when no run has happened yet, or when strictly more than
/// `interval_ms` has elapsed since the last recorded run. Ticks that arrive
/// with an earlier timestamp than the last run are never due.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: u64,
    last_run_ms: Option<u64>,
}

impl Throttle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_run_ms: None,
        }
    }

    /// Whether a run at `now_ms` would be admitted. Does not record anything.
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_run_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > self.interval_ms,
        }
    }

    /// Record that a run completed at `now_ms`.
    pub fn mark(&mut self, now_ms: u64) {
        self.last_run_ms = Some(now_ms);
    }

    /// Check and record in one step.
    pub fn should_run(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            self.mark(now_ms);
            true
        } else {
            false
        }
    }

    pub fn last_run_ms(&self) -> Option<u64> {
        self.last_run_ms
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Forget the last run so the next tick is admitted.
    pub fn reset(&mut self) {
        self.last_run_ms = None;
    }
}
