//! JSONL record types exchanged with external tools.
//!
//! Track logs come from an external detector/tracker, selection scripts stand
//! in for interactive re-acquisition, and crop plans are written by the
//! stabilizer. Every file holds one JSON object per line; blank lines and
//! lines starting with `#` are skipped.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::FrameError;
use crate::geometry::{BoundingBox, CropWindow};

/// Lifecycle of the follow controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    /// No box has been accepted yet.
    #[default]
    Uninitialized,
    /// The tracker reported the target on the last frame.
    Tracking,
    /// The tracker lost the target; the next frame re-acquires.
    Lost,
    /// Re-acquisition was aborted; no further windows are produced.
    Terminated,
}

/// One frame of externally produced tracker output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Source frame index.
    pub frame: u64,

    /// Reported box, `null` when the tracker failed on this frame.
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
}

/// A scripted answer to a re-acquisition request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRecord {
    /// Frame on which the selection is made.
    pub frame: u64,

    /// Selected box; a degenerate box aborts the run.
    pub bbox: BoundingBox,
}

/// One emitted crop window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropPlanRecord {
    pub frame: u64,
    pub state: ControllerState,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,

    /// Whether the box for this frame came from re-acquisition.
    #[serde(default)]
    pub reacquired: bool,
}

impl CropPlanRecord {
    pub fn new(frame: u64, state: ControllerState, window: CropWindow, reacquired: bool) -> Self {
        Self {
            frame,
            state,
            x: window.x,
            y: window.y,
            width: window.width,
            height: window.height,
            reacquired,
        }
    }

    pub fn window(&self) -> CropWindow {
        CropWindow {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Parse records from JSONL content.
///
/// Errors carry the 1-based line number of the offending line.
pub fn parse_jsonl<T: DeserializeOwned>(jsonl: &str) -> Result<Vec<T>, FrameError> {
    jsonl
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_no, line)| {
            serde_json::from_str(line).map_err(|source| FrameError::ParseError {
                line: line_no,
                source,
            })
        })
        .collect()
}

/// Read and parse a JSONL file.
pub fn load_jsonl<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, FrameError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| FrameError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_jsonl(&content)
}

/// Serialize a single record as one JSONL line (newline included).
pub fn to_jsonl_line<T: Serialize>(record: &T) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    Ok(line)
}

/// Serialize records to JSONL format.
pub fn serialize_jsonl<T: Serialize>(records: &[T]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for record in records {
        output.push_str(&to_jsonl_line(record)?);
    }
    Ok(output)
}
