//! Collaborators that answer from recorded data.
//!
//! They let the stabilizer run offline over a track log produced by any
//! external detector/tracker, with scripted or log-driven re-acquisition.

use std::collections::BTreeMap;

use followcrop_frame_model::{BoundingBox, Frame, SelectionRecord, TrackRecord};

use crate::collaborators::{ObjectTracker, Reacquirer};

/// Replays per-frame tracker output from a track log.
///
/// Frames missing from the log, or logged with a `null` box, count as
/// tracker failures.
#[derive(Debug, Clone, Default)]
pub struct ReplayTracker {
    boxes: BTreeMap<u64, BoundingBox>,
    active: bool,
}

impl ReplayTracker {
    pub fn from_records(records: &[TrackRecord]) -> Self {
        let boxes = records
            .iter()
            .filter_map(|r| r.bbox.map(|b| (r.frame, b)))
            .collect();
        Self {
            boxes,
            active: false,
        }
    }

    /// Highest frame index with a logged box.
    pub fn last_frame(&self) -> Option<u64> {
        self.boxes.keys().next_back().copied()
    }
}

impl ObjectTracker for ReplayTracker {
    fn init(&mut self, _frame: &Frame, bbox: &BoundingBox) -> bool {
        self.active = !bbox.is_degenerate();
        self.active
    }

    fn update(&mut self, frame: &Frame) -> Option<BoundingBox> {
        if !self.active {
            return None;
        }
        self.boxes.get(&frame.index).copied()
    }
}

/// Answers re-acquisition requests from a selection script.
///
/// Frames without a scripted selection abort the run.
#[derive(Debug, Clone, Default)]
pub struct ScriptedReacquirer {
    selections: BTreeMap<u64, BoundingBox>,
}

impl ScriptedReacquirer {
    pub fn from_records(records: &[SelectionRecord]) -> Self {
        Self {
            selections: records.iter().map(|r| (r.frame, r.bbox)).collect(),
        }
    }
}

impl Reacquirer for ScriptedReacquirer {
    fn select(&mut self, frame: &Frame) -> BoundingBox {
        match self.selections.get(&frame.index) {
            Some(bbox) => *bbox,
            None => {
                tracing::info!(frame = frame.index, "no scripted selection for frame");
                BoundingBox::EMPTY
            }
        }
    }
}

/// Re-acquires from the track log itself: the next logged sighting at or
/// after the requesting frame. Aborts once the log has no sightings left.
#[derive(Debug, Clone, Default)]
pub struct TrackLogReacquirer {
    boxes: BTreeMap<u64, BoundingBox>,
}

impl TrackLogReacquirer {
    pub fn from_records(records: &[TrackRecord]) -> Self {
        Self {
            boxes: records
                .iter()
                .filter_map(|r| r.bbox.map(|b| (r.frame, b)))
                .collect(),
        }
    }
}

impl Reacquirer for TrackLogReacquirer {
    fn select(&mut self, frame: &Frame) -> BoundingBox {
        self.boxes
            .range(frame.index..)
            .next()
            .map(|(_, bbox)| *bbox)
            .unwrap_or(BoundingBox::EMPTY)
    }
}
