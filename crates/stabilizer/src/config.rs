//! Stabilizer configuration.

use followcrop_common::config::StabilizerDefaults;
use followcrop_common::error::{FollowcropError, FollowcropResult};
use followcrop_frame_model::{FrameSize, OutputSize};
use serde::{Deserialize, Serialize};

/// Fixed parameters of a follow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilizerConfig {
    /// Distance from the box's horizontal centre back to the crop's left edge.
    pub margin_x: f64,

    /// Distance from the box's top edge back to the crop's top edge.
    pub margin_y: f64,

    /// Size of the emitted crop.
    pub output: OutputSize,

    /// Divisor of the remaining gap per frame. 1 follows instantly.
    pub smoothing_rate: f64,

    /// Snap onto the target after every re-acquisition, not only the first.
    pub reset_on_reacquire: bool,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self::from(&StabilizerDefaults::default())
    }
}

impl From<&StabilizerDefaults> for StabilizerConfig {
    fn from(defaults: &StabilizerDefaults) -> Self {
        Self {
            margin_x: defaults.margin_x,
            margin_y: defaults.margin_y,
            output: OutputSize::new(defaults.output_width, defaults.output_height),
            smoothing_rate: defaults.smoothing_rate,
            reset_on_reacquire: defaults.reset_on_reacquire,
        }
    }
}

impl From<&StabilizerConfig> for StabilizerDefaults {
    fn from(config: &StabilizerConfig) -> Self {
        Self {
            margin_x: config.margin_x,
            margin_y: config.margin_y,
            output_width: config.output.width,
            output_height: config.output.height,
            smoothing_rate: config.smoothing_rate,
            reset_on_reacquire: config.reset_on_reacquire,
        }
    }
}

impl StabilizerConfig {
    /// 994x1080 crop hung from the box top, fast follow.
    pub fn wide_preset() -> Self {
        Self {
            margin_x: 497.0,
            margin_y: 0.0,
            output: OutputSize::new(994, 1080),
            smoothing_rate: 4.0,
            reset_on_reacquire: false,
        }
    }

    /// Check the parameters that do not depend on the frame size.
    pub fn validate(&self) -> FollowcropResult<()> {
        if !self.margin_x.is_finite() || !self.margin_y.is_finite() {
            return Err(FollowcropError::config(format!(
                "margins must be finite (got {}, {})",
                self.margin_x, self.margin_y
            )));
        }
        if !self.smoothing_rate.is_finite() || self.smoothing_rate < 1.0 {
            return Err(FollowcropError::config(format!(
                "smoothing rate must be a finite value >= 1 (got {})",
                self.smoothing_rate
            )));
        }
        if self.output.width == 0 || self.output.height == 0 {
            return Err(FollowcropError::config("output size must be non-zero"));
        }
        Ok(())
    }

    /// Check the crop fits inside frames of `frame` size.
    ///
    /// Run once before the first tick; a failure here is fatal.
    pub fn validate_for(&self, frame: FrameSize) -> FollowcropResult<()> {
        self.validate()?;
        if !self.output.fits_within(frame) {
            return Err(FollowcropError::out_of_bounds(
                self.output.width,
                self.output.height,
                frame.width,
                frame.height,
            ));
        }
        Ok(())
    }
}
