//! Clock and timing utilities for per-frame telemetry.
//!
//! The stabilizer itself is clock-free. Timing only feeds the telemetry
//! collaborator (frames-per-second readout) and the run summary.

use std::time::{Duration, Instant};

/// A run clock anchored to the moment processing started.
#[derive(Debug, Clone)]
pub struct RunClock {
    /// The instant processing started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl RunClock {
    /// Create a new run clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Time elapsed since the run started.
    pub fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Seconds elapsed since the run started.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at run start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Measures the instantaneous processing rate between consecutive ticks.
#[derive(Debug)]
pub struct TickTimer {
    last_tick: Instant,
    ticks: u64,
}

impl TickTimer {
    /// Start timing; the first tick is measured from this moment.
    pub fn start() -> Self {
        Self::start_at(Instant::now())
    }

    /// Start timing from a known instant.
    pub fn start_at(now: Instant) -> Self {
        Self {
            last_tick: now,
            ticks: 0,
        }
    }

    /// Record a tick now and return the rate in ticks per second.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    /// Record a tick at `now` and return the rate in ticks per second.
    ///
    /// Returns 0.0 when no measurable time passed since the previous tick.
    pub fn tick_at(&mut self, now: Instant) -> f64 {
        let interval = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.ticks += 1;

        let secs = interval.as_secs_f64();
        if secs <= 0.0 {
            0.0
        } else {
            1.0 / secs
        }
    }

    /// Number of ticks recorded so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// Convert a frame count and elapsed duration into an average rate.
pub fn average_fps(frames: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    frames as f64 / secs
}
