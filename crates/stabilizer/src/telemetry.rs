//! Per-frame telemetry.
//!
//! Frame rate, follow shift and window position are presentation data. The
//! controller does not keep them; the pipeline hands them to a `Telemetry`
//! implementation once per frame.

use followcrop_common::config::TelemetryDefaults;

use crate::controller::TickReport;

/// Values describing one processed frame.
#[derive(Debug, Clone, Copy)]
pub struct TickTelemetry<'a> {
    /// Position of the frame in the source stream.
    pub frame_index: u64,

    /// Instantaneous processing rate.
    pub fps: f64,

    pub report: &'a TickReport,
}

/// Receives telemetry for every emitted crop.
pub trait Telemetry {
    fn observe(&mut self, tick: &TickTelemetry<'_>);
}

/// Discards all telemetry.
#[derive(Debug, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn observe(&mut self, _tick: &TickTelemetry<'_>) {}
}

/// Logs a preview line every `preview_every` frames and a debug line for the
/// rest.
#[derive(Debug)]
pub struct LogTelemetry {
    preview_every: u64,
    observed: u64,
}

impl LogTelemetry {
    pub fn new(preview_every: u64) -> Self {
        Self {
            preview_every: preview_every.max(1),
            observed: 0,
        }
    }

    pub fn from_defaults(defaults: &TelemetryDefaults) -> Self {
        Self::new(defaults.preview_every)
    }

    /// Whether `frame_index` is a preview frame.
    pub fn is_preview_frame(&self, frame_index: u64) -> bool {
        frame_index % self.preview_every == 0
    }

    pub fn observed(&self) -> u64 {
        self.observed
    }
}

impl Default for LogTelemetry {
    fn default() -> Self {
        Self::from_defaults(&TelemetryDefaults::default())
    }
}

impl Telemetry for LogTelemetry {
    fn observe(&mut self, tick: &TickTelemetry<'_>) {
        self.observed += 1;
        let report = tick.report;

        if self.is_preview_frame(tick.frame_index) {
            tracing::info!(
                frame = tick.frame_index,
                fps = format!("{:.1}", tick.fps),
                shift = format!("{:.1}", report.max_shift),
                state = ?report.state,
                x = report.window.x,
                y = report.window.y,
                "follow preview"
            );
        } else {
            tracing::debug!(
                frame = tick.frame_index,
                fps = tick.fps,
                shift = report.max_shift,
                "follow tick"
            );
        }
    }
}
