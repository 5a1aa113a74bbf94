//! Geometry types for tracker boxes and crop windows.
//!
//! Tracker boxes are fractional (`f64`), the crop window origin is integral.
//! All values are in source-frame pixels.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle reported by a tracker or a re-acquirer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub w: f64,
    /// Height.
    pub h: f64,
}

impl BoundingBox {
    /// The empty selection: top-left equals bottom-right.
    ///
    /// Returned by a re-acquirer to abort the run.
    pub const EMPTY: BoundingBox = BoundingBox {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Build a box from its top-left and bottom-right corners.
    pub fn from_corners(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            x: left,
            y: top,
            w: right - left,
            h: bottom - top,
        }
    }

    /// Top-left corner.
    pub fn top_left(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Bottom-right corner.
    pub fn bottom_right(&self) -> (f64, f64) {
        (self.x + self.w, self.y + self.h)
    }

    /// Horizontal centre, averaged from both corners.
    pub fn center_x(&self) -> f64 {
        (self.x + (self.x + self.w)) / 2.0
    }

    /// Vertical centre.
    pub fn center_y(&self) -> f64 {
        (self.y + (self.y + self.h)) / 2.0
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    /// Whether this box encloses no area.
    ///
    /// Covers the `top_left == bottom_right` abort sentinel as well as boxes
    /// with a collapsed or negative side and non-finite values.
    pub fn is_degenerate(&self) -> bool {
        !(self.w > 0.0 && self.h > 0.0) || !self.x.is_finite() || !self.y.is_finite()
    }
}

/// An integer point in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Dimensions of a source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Fixed dimensions of the emitted crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether a crop of this size fits inside `frame`.
    pub fn fits_within(&self, frame: FrameSize) -> bool {
        self.width <= frame.width && self.height <= frame.height
    }

    /// Largest valid crop origin inside `frame`.
    ///
    /// Returns `None` when the crop does not fit.
    pub fn max_origin(&self, frame: FrameSize) -> Option<PixelPoint> {
        if !self.fits_within(frame) {
            return None;
        }
        let x = i32::try_from(frame.width - self.width).ok()?;
        let y = i32::try_from(frame.height - self.height).ok()?;
        Some(PixelPoint::new(x, y))
    }
}

/// A fixed-size window into a source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropWindow {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CropWindow {
    /// Place a window of `size` with its top-left corner at `origin`.
    pub fn at(origin: PixelPoint, size: OutputSize) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn origin(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    /// Right edge (exclusive).
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Bottom edge (exclusive).
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Check the window lies entirely inside `frame`.
    pub fn is_within(&self, frame: FrameSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.right() <= frame.width as i64
            && self.bottom() <= frame.height as i64
    }
}
