//! Errors raised by frame buffers, raw frame streams and record files.

use std::path::PathBuf;

/// Errors that can occur when working with frames and record files.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Stream error: {source}")]
    Stream {
        #[from]
        source: std::io::Error,
    },

    #[error("Parse error on line {line}: {source}")]
    ParseError {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Frame buffer holds {actual} bytes, expected {expected} for {width}x{height} RGB24")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Crop window {width}x{height} at ({x}, {y}) leaves frame {frame_width}x{frame_height}"
    )]
    WindowOutOfFrame {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("Truncated frame {index}: read {read} of {expected} bytes")]
    Truncated {
        index: u64,
        read: usize,
        expected: usize,
    },
}
