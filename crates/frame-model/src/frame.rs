//! Packed RGB24 frame buffers.

use std::sync::Arc;

use crate::error::FrameError;
use crate::geometry::{CropWindow, FrameSize};

/// Bytes per pixel of a packed RGB24 frame.
pub const BYTES_PER_PIXEL: usize = 3;

/// A single decoded frame in packed RGB24, row-major.
///
/// Pixel data is reference-counted: cloning a frame is cheap and several
/// metadata-only frames can share one blank buffer.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Zero-based position in the source stream.
    pub index: u64,
    pub width: u32,
    pub height: u32,
    data: Arc<[u8]>,
}

/// Byte length of a `width x height` RGB24 frame.
pub fn frame_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}

impl Frame {
    /// Wrap an owned buffer, checking its length against the dimensions.
    pub fn new(index: u64, width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        Self::shared(index, width, height, Arc::from(data))
    }

    /// Wrap a shared buffer, checking its length against the dimensions.
    pub fn shared(
        index: u64,
        width: u32,
        height: u32,
        data: Arc<[u8]>,
    ) -> Result<Self, FrameError> {
        let expected = frame_len(width, height);
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            index,
            width,
            height,
            data,
        })
    }

    /// An all-black frame.
    pub fn blank(index: u64, width: u32, height: u32) -> Self {
        Self {
            index,
            width,
            height,
            data: Arc::from(vec![0u8; frame_len(width, height)]),
        }
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGB value at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = self.data.get(start..start + BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2]])
    }

    /// Copy the region under `window` into a new frame with the same index.
    ///
    /// Only the window rows are touched, O(crop area).
    pub fn crop(&self, window: &CropWindow) -> Result<Frame, FrameError> {
        if !window.is_within(self.size()) {
            return Err(FrameError::WindowOutOfFrame {
                x: window.x,
                y: window.y,
                width: window.width,
                height: window.height,
                frame_width: self.width,
                frame_height: self.height,
            });
        }

        let x1 = window.x as usize;
        let y1 = window.y as usize;
        let src_stride = self.width as usize * BYTES_PER_PIXEL;
        let dst_stride = window.width as usize * BYTES_PER_PIXEL;

        let mut out = Vec::with_capacity(dst_stride * window.height as usize);
        for row in 0..window.height as usize {
            let src_start = (y1 + row) * src_stride + x1 * BYTES_PER_PIXEL;
            out.extend_from_slice(&self.data[src_start..src_start + dst_stride]);
        }

        Frame::new(self.index, window.width, window.height, out)
    }
}
