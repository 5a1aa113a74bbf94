//! FollowCrop Stabilizer: the virtual camera
//!
//! Turns a per-frame object box into a steadily moving, fixed-size crop:
//! - **Controller:** Tracking / Lost / re-acquisition state machine
//! - **Smoothing:** Integer follow filter with truncating steps and frame clamping
//! - **Collaborators:** Tracker and re-acquirer seams plus replay implementations
//! - **Pipeline:** Single-threaded source → controller → crop → sink loop
//!
//! Detection, decoding and encoding stay outside this crate; they are reached
//! only through the traits in [`collaborators`] and [`pipeline`].

pub mod collaborators;
pub mod config;
pub mod controller;
pub mod pipeline;
pub mod replay;
pub mod smoothing;
pub mod telemetry;

pub use collaborators::{ObjectTracker, Reacquirer};
pub use config::StabilizerConfig;
pub use controller::{ControllerStats, StabilizationController, TickOutcome, TickReport};
pub use followcrop_frame_model::ControllerState;
pub use pipeline::{run_pipeline, EndReason, RunSummary};
pub use smoothing::{SmoothingFilter, TargetPoint};
