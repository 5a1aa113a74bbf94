//! Error types shared across FollowCrop crates.

use std::path::PathBuf;

/// Top-level error type for FollowCrop operations.
///
/// Per-frame tracking failures are not errors: the stabilizer recovers from
/// them locally. Only configuration problems, broken frame I/O and malformed
/// input files surface through this type.
#[derive(Debug, thiserror::Error)]
pub enum FollowcropError {
    #[error(
        "Output size {output_width}x{output_height} does not fit inside frame {frame_width}x{frame_height}"
    )]
    OutOfBounds {
        output_width: u32,
        output_height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Frame error: {message}")]
    Frame { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using FollowcropError.
pub type FollowcropResult<T> = Result<T, FollowcropError>;

impl FollowcropError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn frame(msg: impl Into<String>) -> Self {
        Self::Frame {
            message: msg.into(),
        }
    }

    pub fn out_of_bounds(
        output_width: u32,
        output_height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self::OutOfBounds {
            output_width,
            output_height,
            frame_width,
            frame_height,
        }
    }
}
