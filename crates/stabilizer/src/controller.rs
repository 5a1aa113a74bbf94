//! The follow controller.
//!
//! # Per-frame algorithm
//!
//! 1. While `Tracking`, ask the tracker for the box. A failure moves to `Lost`.
//! 2. In `Uninitialized` or `Lost` (including a failure from step 1 on this
//!    same frame), ask the re-acquirer. A degenerate selection terminates the
//!    run; otherwise the tracker is re-initialised on the selection.
//! 3. Derive the target point from the box and the configured margins.
//! 4. Update the smoothing filter once, then clamp the origin into the frame.
//! 5. Emit the crop window at the clamped origin.
//!
//! Tracker problems never surface as errors; they are logged, counted and
//! handled by the state machine.

use followcrop_common::error::FollowcropResult;
use followcrop_frame_model::{BoundingBox, ControllerState, CropWindow, Frame, PixelPoint};
use tracing::{debug, info, warn};

use crate::collaborators::{ObjectTracker, Reacquirer};
use crate::config::StabilizerConfig;
use crate::smoothing::{SmoothingFilter, TargetPoint};

/// What happened on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub frame_index: u64,

    /// State after the tick.
    pub state: ControllerState,

    /// Window to extract for this frame.
    pub window: CropWindow,

    /// Box the window was derived from.
    pub bbox: BoundingBox,

    pub target: TargetPoint,

    /// The box came from the re-acquirer rather than the tracker.
    pub reacquired: bool,

    /// Larger x/y gap between target and origin before smoothing.
    pub max_shift: f64,
}

/// Result of a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A crop window was produced.
    Crop(TickReport),
    /// Re-acquisition was aborted. The stream should end cleanly.
    Terminated,
}

/// Counters of non-fatal tracking events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    /// Boxes obtained from the re-acquirer, including the initial one.
    pub reacquisitions: u64,
    /// Tracker updates that lost the target.
    pub tracker_failures: u64,
    /// Tracker initialisations that failed.
    pub init_failures: u64,
}

/// Owns the tracking state, the smoothing filter and both collaborators.
pub struct StabilizationController<T, R> {
    config: StabilizerConfig,
    tracker: T,
    reacquirer: R,
    filter: SmoothingFilter,
    state: ControllerState,
    stats: ControllerStats,
}

impl<T: ObjectTracker, R: Reacquirer> StabilizationController<T, R> {
    /// Build a controller. Frame-size checks happen separately through
    /// [`StabilizerConfig::validate_for`] before the first frame.
    pub fn new(config: StabilizerConfig, tracker: T, reacquirer: R) -> FollowcropResult<Self> {
        config.validate()?;
        let filter = SmoothingFilter::new(config.smoothing_rate, config.output);
        Ok(Self {
            config,
            tracker,
            reacquirer,
            filter,
            state: ControllerState::Uninitialized,
            stats: ControllerStats::default(),
        })
    }

    pub fn config(&self) -> &StabilizerConfig {
        &self.config
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }

    /// Current crop origin, `None` before the first window.
    pub fn position(&self) -> Option<PixelPoint> {
        self.filter.position()
    }

    /// Return to `Uninitialized` and forget the crop origin.
    pub fn reinitialize(&mut self) {
        self.state = ControllerState::Uninitialized;
        self.filter.reset();
    }

    /// Process one frame.
    pub fn tick(&mut self, frame: &Frame) -> TickOutcome {
        if self.state == ControllerState::Terminated {
            return TickOutcome::Terminated;
        }

        let tracked = match self.state {
            ControllerState::Tracking => self.track(frame),
            _ => None,
        };

        let (bbox, reacquired) = match tracked {
            Some(bbox) => (bbox, false),
            None => match self.reacquire(frame) {
                Some(bbox) => (bbox, true),
                None => return TickOutcome::Terminated,
            },
        };

        let target = TargetPoint::from_box(&bbox, self.config.margin_x, self.config.margin_y);
        let snap = reacquired && self.config.reset_on_reacquire;
        let step = self.filter.update(target, frame.size(), snap);
        let window = CropWindow::at(step.position, self.config.output);

        debug!(
            frame = frame.index,
            state = ?self.state,
            x = window.x,
            y = window.y,
            snapped = step.snapped,
            "crop window"
        );

        TickOutcome::Crop(TickReport {
            frame_index: frame.index,
            state: self.state,
            window,
            bbox,
            target,
            reacquired,
            max_shift: step.max_shift,
        })
    }

    fn track(&mut self, frame: &Frame) -> Option<BoundingBox> {
        match self.tracker.update(frame) {
            Some(bbox) => Some(bbox),
            None => {
                warn!(frame = frame.index, "tracker lost the target");
                self.stats.tracker_failures += 1;
                self.state = ControllerState::Lost;
                None
            }
        }
    }

    /// Ask for a new box and restart the tracker on it. `None` means abort.
    fn reacquire(&mut self, frame: &Frame) -> Option<BoundingBox> {
        let selection = self.reacquirer.select(frame);
        if selection.is_degenerate() {
            info!(frame = frame.index, "re-acquisition aborted, ending stream");
            self.state = ControllerState::Terminated;
            return None;
        }

        self.stats.reacquisitions += 1;
        if self.tracker.init(frame, &selection) {
            info!(
                frame = frame.index,
                x = selection.x,
                y = selection.y,
                w = selection.w,
                h = selection.h,
                "tracker initialised"
            );
            self.state = ControllerState::Tracking;
        } else {
            warn!(frame = frame.index, "couldn't initialize tracker");
            self.stats.init_failures += 1;
        }
        Some(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use followcrop_frame_model::OutputSize;
    use std::collections::VecDeque;

    /// Tracker answering from a queue; `None` entries are failures.
    struct QueueTracker {
        updates: VecDeque<Option<BoundingBox>>,
        init_ok: bool,
    }

    impl QueueTracker {
        fn new(updates: Vec<Option<BoundingBox>>) -> Self {
            Self {
                updates: updates.into(),
                init_ok: true,
            }
        }
    }

    impl ObjectTracker for QueueTracker {
        fn init(&mut self, _frame: &Frame, _bbox: &BoundingBox) -> bool {
            self.init_ok
        }

        fn update(&mut self, _frame: &Frame) -> Option<BoundingBox> {
            self.updates.pop_front().flatten()
        }
    }

    struct QueueReacquirer(VecDeque<BoundingBox>);

    impl Reacquirer for QueueReacquirer {
        fn select(&mut self, _frame: &Frame) -> BoundingBox {
            self.0.pop_front().unwrap_or(BoundingBox::EMPTY)
        }
    }

    /// Box with horizontal centre `cx` and top `top`.
    fn boxed(cx: f64, top: f64) -> BoundingBox {
        BoundingBox::new(cx - 40.0, top, 80.0, 110.0)
    }

    fn config() -> StabilizerConfig {
        StabilizerConfig {
            margin_x: 392.0,
            margin_y: 40.0,
            output: OutputSize::new(784, 851),
            smoothing_rate: 16.0,
            reset_on_reacquire: false,
        }
    }

    fn frame(index: u64) -> Frame {
        // Only the size matters to the controller.
        Frame::blank(index, 1184, 851)
    }

    fn crop(outcome: TickOutcome) -> TickReport {
        match outcome {
            TickOutcome::Crop(report) => report,
            TickOutcome::Terminated => panic!("unexpected termination"),
        }
    }

    #[test]
    fn test_first_tick_reacquires_and_snaps() {
        let tracker = QueueTracker::new(vec![]);
        let reacquirer = QueueReacquirer(vec![boxed(450.0, 300.0)].into());
        let mut controller = StabilizationController::new(config(), tracker, reacquirer).unwrap();

        assert_eq!(controller.state(), ControllerState::Uninitialized);
        let report = crop(controller.tick(&frame(0)));

        assert!(report.reacquired);
        assert_eq!(report.state, ControllerState::Tracking);
        assert_eq!(report.window.x, 58);
        assert_eq!(report.window.y, 0);
        assert_eq!(controller.stats().reacquisitions, 1);
    }

    #[test]
    fn test_unchanged_box_keeps_position() {
        let tracker = QueueTracker::new(vec![Some(boxed(450.0, 40.0))]);
        let reacquirer = QueueReacquirer(vec![boxed(450.0, 40.0)].into());
        let mut controller = StabilizationController::new(config(), tracker, reacquirer).unwrap();

        crop(controller.tick(&frame(0)));
        let report = crop(controller.tick(&frame(1)));
        assert!(!report.reacquired);
        assert_eq!(report.window.origin(), PixelPoint::new(58, 0));
    }

    #[test]
    fn test_failure_reacquires_on_same_frame() {
        let tracker = QueueTracker::new(vec![None]);
        let reacquirer = QueueReacquirer(vec![boxed(450.0, 40.0), boxed(610.0, 40.0)].into());
        let mut controller = StabilizationController::new(config(), tracker, reacquirer).unwrap();

        crop(controller.tick(&frame(0)));
        let report = crop(controller.tick(&frame(1)));

        assert!(report.reacquired);
        assert_eq!(report.state, ControllerState::Tracking);
        // Without reset the new box is smoothed: 58 + trunc(160 / 16).
        assert_eq!(report.window.x, 68);
        assert_eq!(controller.stats().tracker_failures, 1);
        assert_eq!(controller.stats().reacquisitions, 2);
    }

    #[test]
    fn test_reset_on_reacquire_snaps() {
        let tracker = QueueTracker::new(vec![None]);
        let reacquirer = QueueReacquirer(vec![boxed(450.0, 40.0), boxed(610.0, 40.0)].into());
        let config = StabilizerConfig {
            reset_on_reacquire: true,
            ..config()
        };
        let mut controller = StabilizationController::new(config, tracker, reacquirer).unwrap();

        crop(controller.tick(&frame(0)));
        let report = crop(controller.tick(&frame(1)));
        assert_eq!(report.window.x, 218);
        assert_eq!(report.max_shift, 0.0);
    }

    #[test]
    fn test_abort_terminates_for_good() {
        let tracker = QueueTracker::new(vec![None]);
        let reacquirer = QueueReacquirer(vec![boxed(450.0, 40.0)].into());
        let mut controller = StabilizationController::new(config(), tracker, reacquirer).unwrap();

        crop(controller.tick(&frame(0)));
        assert_eq!(controller.tick(&frame(1)), TickOutcome::Terminated);
        assert_eq!(controller.state(), ControllerState::Terminated);
        assert_eq!(controller.tick(&frame(2)), TickOutcome::Terminated);
    }

    #[test]
    fn test_init_failure_keeps_state_and_uses_box() {
        let mut tracker = QueueTracker::new(vec![]);
        tracker.init_ok = false;
        let reacquirer = QueueReacquirer(vec![boxed(450.0, 40.0), boxed(450.0, 40.0)].into());
        let mut controller = StabilizationController::new(config(), tracker, reacquirer).unwrap();

        let report = crop(controller.tick(&frame(0)));
        assert_eq!(report.state, ControllerState::Uninitialized);
        assert_eq!(report.window.x, 58);
        assert_eq!(controller.stats().init_failures, 1);

        // Still uninitialised: the next frame asks the re-acquirer again.
        let report = crop(controller.tick(&frame(1)));
        assert!(report.reacquired);
        assert_eq!(controller.stats().reacquisitions, 2);
    }

    #[test]
    fn test_clamp_to_right_edge() {
        // centre 892 - 392 = 500, clamped to 1184 - 784 = 400
        let tracker = QueueTracker::new(vec![]);
        let reacquirer = QueueReacquirer(vec![boxed(892.0, 40.0)].into());
        let mut controller = StabilizationController::new(config(), tracker, reacquirer).unwrap();
        let report = crop(controller.tick(&frame(0)));
        assert_eq!(report.window.x, 400);
        assert_eq!(controller.position(), Some(PixelPoint::new(400, 0)));
    }

    #[test]
    fn test_reinitialize_forgets_position() {
        let tracker = QueueTracker::new(vec![]);
        let reacquirer = QueueReacquirer(vec![boxed(450.0, 40.0), boxed(700.0, 40.0)].into());
        let mut controller = StabilizationController::new(config(), tracker, reacquirer).unwrap();

        crop(controller.tick(&frame(0)));
        controller.reinitialize();
        assert_eq!(controller.state(), ControllerState::Uninitialized);

        let report = crop(controller.tick(&frame(1)));
        assert_eq!(report.window.x, 308);
    }

    #[test]
    fn test_invalid_rate_rejected_at_construction() {
        let config = StabilizerConfig {
            smoothing_rate: 0.0,
            ..config()
        };
        let result = StabilizationController::new(
            config,
            QueueTracker::new(vec![]),
            QueueReacquirer(VecDeque::new()),
        );
        assert!(result.is_err());
    }
}
