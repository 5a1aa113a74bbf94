//! Integer follow filter for the crop origin.
//!
//! Each frame the origin closes `1 / rate` of its gap to the target, with the
//! step truncated toward zero. Truncation leaves a dead zone: once the gap is
//! smaller than `rate` pixels the origin stops moving. Small jitter in the
//! tracker box therefore never reaches the output.

use followcrop_frame_model::{BoundingBox, FrameSize, OutputSize, PixelPoint};

/// Where the crop origin should be for a given box.
///
/// Derived fresh every frame and never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetPoint {
    pub x: f64,
    pub y: f64,
}

impl TargetPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Box centre minus `margin_x` horizontally, box top minus `margin_y`
    /// vertically.
    pub fn from_box(bbox: &BoundingBox, margin_x: f64, margin_y: f64) -> Self {
        Self {
            x: bbox.center_x() - margin_x,
            y: bbox.top_left().1 - margin_y,
        }
    }
}

/// Result of a single filter update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterStep {
    /// Clamped crop origin after the update.
    pub position: PixelPoint,

    /// Larger of the x/y gaps to the target before the step; 0 on a snap.
    pub max_shift: f64,

    /// Whether the origin was set straight onto the target.
    pub snapped: bool,
}

/// The persistent crop origin and its update rule.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    rate: f64,
    output: OutputSize,
    position: Option<PixelPoint>,
}

impl SmoothingFilter {
    /// `rate` must be >= 1; see `StabilizerConfig::validate`.
    pub fn new(rate: f64, output: OutputSize) -> Self {
        Self {
            rate,
            output,
            position: None,
        }
    }

    /// Current origin, `None` until the first update.
    pub fn position(&self) -> Option<PixelPoint> {
        self.position
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Forget the origin; the next update snaps onto its target.
    pub fn reset(&mut self) {
        self.position = None;
    }

    /// Move toward `target` and clamp into `frame`.
    ///
    /// The first update, and any update with `snap` set, places the origin at
    /// `round(target)` with no lag. Otherwise each axis moves by
    /// `trunc((target - position) / rate)`.
    pub fn update(&mut self, target: TargetPoint, frame: FrameSize, snap: bool) -> FilterStep {
        let (x, y, max_shift, snapped) = match self.position {
            Some(current) if !snap => {
                let dx = target.x - current.x as f64;
                let dy = target.y - current.y as f64;
                (
                    current.x.saturating_add(step(dx, self.rate)),
                    current.y.saturating_add(step(dy, self.rate)),
                    dx.max(dy),
                    false,
                )
            }
            _ => (
                target.x.round() as i32,
                target.y.round() as i32,
                0.0,
                true,
            ),
        };

        let position = clamp_origin(PixelPoint::new(x, y), self.output, frame);
        self.position = Some(position);

        FilterStep {
            position,
            max_shift,
            snapped,
        }
    }
}

/// Truncated fraction of `gap`. Float-to-int casts truncate toward zero.
fn step(gap: f64, rate: f64) -> i32 {
    (gap / rate).trunc() as i32
}

/// Clamp an origin so a crop of `output` stays inside `frame`.
///
/// A crop larger than the frame pins the origin at (0, 0).
pub fn clamp_origin(origin: PixelPoint, output: OutputSize, frame: FrameSize) -> PixelPoint {
    let max = output.max_origin(frame).unwrap_or_default();
    PixelPoint::new(origin.x.clamp(0, max.x), origin.y.clamp(0, max.y))
}
