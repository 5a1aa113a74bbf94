//! Seams to the external tracker and re-acquisition capabilities.
//!
//! Concrete tracking algorithms are injected by the caller. The controller
//! never selects one by name.

use followcrop_frame_model::{BoundingBox, Frame};

/// A single-object visual tracker.
pub trait ObjectTracker {
    /// Start tracking `bbox` on `frame`. Returns `false` if the tracker could
    /// not be initialised; the caller logs and carries on.
    fn init(&mut self, frame: &Frame, bbox: &BoundingBox) -> bool;

    /// Locate the target on the next frame, `None` when it was lost.
    fn update(&mut self, frame: &Frame) -> Option<BoundingBox>;
}

/// Supplies a fresh box once the tracker has lost the target.
///
/// May block indefinitely, e.g. while a person draws a selection.
pub trait Reacquirer {
    /// Return the new box, or a degenerate box (see
    /// [`BoundingBox::is_degenerate`]) to stop the run.
    fn select(&mut self, frame: &Frame) -> BoundingBox;
}

impl<T: ObjectTracker + ?Sized> ObjectTracker for Box<T> {
    fn init(&mut self, frame: &Frame, bbox: &BoundingBox) -> bool {
        (**self).init(frame, bbox)
    }

    fn update(&mut self, frame: &Frame) -> Option<BoundingBox> {
        (**self).update(frame)
    }
}

impl<R: Reacquirer + ?Sized> Reacquirer for Box<R> {
    fn select(&mut self, frame: &Frame) -> BoundingBox {
        (**self).select(frame)
    }
}
