//! FollowCrop Common Utilities
//!
//! Shared infrastructure for all FollowCrop crates:
//! - Error types and result aliases
//! - Tick timing for per-frame telemetry
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
