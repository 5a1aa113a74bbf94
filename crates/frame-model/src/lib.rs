//! FollowCrop Frame Model
//!
//! Defines the core data contracts shared by the stabilizer and its drivers:
//! - **Geometry:** Tracker boxes, integer points, frame/output sizes, crop windows
//! - **Frames:** Packed RGB24 buffers and crop extraction
//! - **I/O:** Raw RGB24 frame streams
//! - **Records:** JSONL track logs, scripted selections, and crop plans
//!
//! All coordinates are in source-frame pixels with the origin at the
//! top-left corner.

pub mod error;
pub mod frame;
pub mod geometry;
pub mod io;
pub mod records;

pub use error::*;
pub use frame::*;
pub use geometry::*;
pub use io::*;
pub use records::*;
