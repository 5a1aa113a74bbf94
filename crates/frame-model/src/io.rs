//! Raw RGB24 frame streams.
//!
//! A raw stream is a plain concatenation of packed RGB24 frames with no
//! header, e.g. the output of `ffmpeg -f rawvideo -pix_fmt rgb24`. Frame
//! dimensions are supplied out of band.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use crate::error::FrameError;
use crate::frame::{frame_len, Frame};
use crate::geometry::FrameSize;

/// Sequential reader of fixed-size raw frames.
pub struct RawFrameReader<R: Read> {
    inner: R,
    size: FrameSize,
    next_index: u64,
}

impl RawFrameReader<BufReader<File>> {
    /// Open a raw frame file.
    pub fn open(path: impl AsRef<Path>, size: FrameSize) -> Result<Self, FrameError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| FrameError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(BufReader::new(file), size))
    }
}

impl<R: Read> RawFrameReader<R> {
    pub fn new(inner: R, size: FrameSize) -> Self {
        Self {
            inner,
            size,
            next_index: 0,
        }
    }

    pub fn frame_size(&self) -> FrameSize {
        self.size
    }

    /// Discard the next `count` frames. Returns how many were skipped
    /// before the stream ended.
    pub fn skip(&mut self, count: u64) -> Result<u64, FrameError> {
        let mut skipped = 0;
        while skipped < count {
            if self.next_frame()?.is_none() {
                break;
            }
            skipped += 1;
        }
        Ok(skipped)
    }

    /// Read the next frame, or `None` at a clean end of stream.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, FrameError> {
        let expected = frame_len(self.size.width, self.size.height);
        let mut buf = vec![0u8; expected];
        let mut read = 0;

        while read < expected {
            match self.inner.read(&mut buf[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if read == 0 {
            return Ok(None);
        }
        if read < expected {
            return Err(FrameError::Truncated {
                index: self.next_index,
                read,
                expected,
            });
        }

        let frame = Frame::new(self.next_index, self.size.width, self.size.height, buf)?;
        self.next_index += 1;
        Ok(Some(frame))
    }
}

/// Sequential writer of raw frames.
pub struct RawFrameWriter<W: Write> {
    inner: W,
    frames_written: u64,
}

impl RawFrameWriter<BufWriter<File>> {
    /// Create (or truncate) a raw frame file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, FrameError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| FrameError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RawFrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            frames_written: 0,
        }
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), FrameError> {
        self.inner.write_all(frame.data())?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), FrameError> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
