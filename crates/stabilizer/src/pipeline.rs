//! Frame-at-a-time follow pipeline.
//!
//! One frame is pulled, tracked, smoothed, cropped and emitted before the
//! next is read. The only blocking points are the source, the tracker and
//! (while lost) the re-acquirer. Cancellation is checked between frames.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use followcrop_common::clock::{average_fps, RunClock, TickTimer};
use followcrop_common::error::{FollowcropError, FollowcropResult};
use followcrop_frame_model::{
    frame_len, to_jsonl_line, CropPlanRecord, Frame, FrameError, FrameSize, RawFrameReader,
    RawFrameWriter,
};

use crate::collaborators::{ObjectTracker, Reacquirer};
use crate::controller::{StabilizationController, TickOutcome, TickReport};
use crate::telemetry::{Telemetry, TickTelemetry};

/// Sequential supplier of decoded frames.
pub trait FrameSource {
    /// Next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> FollowcropResult<Option<Frame>>;
}

/// Sequential consumer of output frames.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> FollowcropResult<()>;

    /// Flush buffered output. Called once when the run ends.
    fn finish(&mut self) -> FollowcropResult<()> {
        Ok(())
    }
}

/// Consumer of per-frame crop decisions.
pub trait CropSink {
    fn emit(&mut self, frame: &Frame, report: &TickReport) -> FollowcropResult<()>;

    /// Flush buffered output. Called once when the run ends.
    fn finish(&mut self) -> FollowcropResult<()> {
        Ok(())
    }
}

pub(crate) fn frame_error(e: FrameError) -> FollowcropError {
    FollowcropError::frame(e.to_string())
}

impl<R: std::io::Read> FrameSource for RawFrameReader<R> {
    fn next_frame(&mut self) -> FollowcropResult<Option<Frame>> {
        RawFrameReader::next_frame(self).map_err(frame_error)
    }
}

impl<W: Write> FrameSink for RawFrameWriter<W> {
    fn write_frame(&mut self, frame: &Frame) -> FollowcropResult<()> {
        RawFrameWriter::write_frame(self, frame).map_err(frame_error)
    }

    fn finish(&mut self) -> FollowcropResult<()> {
        self.flush().map_err(frame_error)
    }
}

/// Collects output frames in memory.
impl FrameSink for Vec<Frame> {
    fn write_frame(&mut self, frame: &Frame) -> FollowcropResult<()> {
        self.push(frame.clone());
        Ok(())
    }
}

/// Yields black frames of a fixed size, sharing one buffer.
///
/// Used to run the controller over a track log when no pixels are needed.
pub struct BlankFrameSource {
    size: FrameSize,
    data: Arc<[u8]>,
    next_index: u64,
    end: Option<u64>,
}

impl BlankFrameSource {
    /// `count` frames, or an endless stream when `None`.
    pub fn new(size: FrameSize, count: Option<u64>) -> Self {
        Self {
            size,
            data: Arc::from(vec![0u8; frame_len(size.width, size.height)]),
            next_index: 0,
            end: count,
        }
    }

    /// Start numbering at `index` instead of 0.
    pub fn starting_at(mut self, index: u64) -> Self {
        self.next_index = index;
        self.end = self.end.map(|count| index + count);
        self
    }
}

impl FrameSource for BlankFrameSource {
    fn next_frame(&mut self) -> FollowcropResult<Option<Frame>> {
        if self.end.is_some_and(|end| self.next_index >= end) {
            return Ok(None);
        }
        let frame = Frame::shared(
            self.next_index,
            self.size.width,
            self.size.height,
            Arc::clone(&self.data),
        )
        .map_err(frame_error)?;
        self.next_index += 1;
        Ok(Some(frame))
    }
}

/// Extracts each crop and hands it to a frame sink.
pub struct FrameCropSink<S> {
    sink: S,
}

impl<S: FrameSink> FrameCropSink<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<S: FrameSink> CropSink for FrameCropSink<S> {
    fn emit(&mut self, frame: &Frame, report: &TickReport) -> FollowcropResult<()> {
        let cropped = frame.crop(&report.window).map_err(frame_error)?;
        self.sink.write_frame(&cropped)
    }

    fn finish(&mut self) -> FollowcropResult<()> {
        self.sink.finish()
    }
}

/// Writes one `CropPlanRecord` JSONL line per crop.
pub struct PlanSink<W: Write> {
    writer: W,
    records: u64,
}

impl<W: Write> PlanSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, records: 0 }
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CropSink for PlanSink<W> {
    fn emit(&mut self, _frame: &Frame, report: &TickReport) -> FollowcropResult<()> {
        let record = CropPlanRecord::new(
            report.frame_index,
            report.state,
            report.window,
            report.reacquired,
        );
        self.writer.write_all(to_jsonl_line(&record)?.as_bytes())?;
        self.records += 1;
        Ok(())
    }

    fn finish(&mut self) -> FollowcropResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Forwards each crop to two sinks, e.g. frames and a plan.
pub struct TeeSink<A, B> {
    first: A,
    second: B,
}

impl<A: CropSink, B: CropSink> TeeSink<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: CropSink, B: CropSink> CropSink for TeeSink<A, B> {
    fn emit(&mut self, frame: &Frame, report: &TickReport) -> FollowcropResult<()> {
        self.first.emit(frame, report)?;
        self.second.emit(frame, report)
    }

    fn finish(&mut self) -> FollowcropResult<()> {
        self.first.finish()?;
        self.second.finish()
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The source ran out of frames.
    SourceExhausted,
    /// Re-acquisition returned the abort sentinel.
    Aborted,
    /// The cancel flag was raised.
    Cancelled,
}

/// Statistics of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub frames_read: u64,
    pub frames_emitted: u64,
    pub reacquisitions: u64,
    pub tracker_failures: u64,
    pub init_failures: u64,
    pub end: EndReason,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Average processing rate over the run.
    pub fn average_fps(&self) -> f64 {
        average_fps(self.frames_read, self.elapsed)
    }
}

/// Drive `controller` over every frame from `source`.
///
/// The configuration is checked against the first frame before it is
/// tracked; an output larger than the frame fails the run. Every later frame
/// must have the same dimensions. An aborted re-acquisition ends the run
/// normally with [`EndReason::Aborted`].
pub fn run_pipeline<S, T, R, K, M>(
    source: &mut S,
    controller: &mut StabilizationController<T, R>,
    sink: &mut K,
    telemetry: &mut M,
    cancel: &AtomicBool,
) -> FollowcropResult<RunSummary>
where
    S: FrameSource + ?Sized,
    T: ObjectTracker,
    R: Reacquirer,
    K: CropSink + ?Sized,
    M: Telemetry + ?Sized,
{
    let clock = RunClock::start();
    let mut timer = TickTimer::start();
    let mut frame_size: Option<FrameSize> = None;
    let mut frames_read = 0u64;
    let mut frames_emitted = 0u64;

    tracing::info!(started_at = clock.epoch_wall(), "follow run started");

    let end = loop {
        if cancel.load(Ordering::Relaxed) {
            tracing::info!(frames_read, "follow run cancelled");
            break EndReason::Cancelled;
        }

        let Some(frame) = source.next_frame()? else {
            break EndReason::SourceExhausted;
        };
        frames_read += 1;

        match frame_size {
            None => {
                controller.config().validate_for(frame.size())?;
                tracing::info!(
                    frame_width = frame.width,
                    frame_height = frame.height,
                    output_width = controller.config().output.width,
                    output_height = controller.config().output.height,
                    "frame size validated"
                );
                frame_size = Some(frame.size());
            }
            Some(size) if size != frame.size() => {
                return Err(FollowcropError::frame(format!(
                    "frame {} is {}x{}, stream started at {}x{}",
                    frame.index, frame.width, frame.height, size.width, size.height
                )));
            }
            Some(_) => {}
        }

        let report = match controller.tick(&frame) {
            TickOutcome::Crop(report) => report,
            TickOutcome::Terminated => break EndReason::Aborted,
        };

        sink.emit(&frame, &report)?;
        frames_emitted += 1;

        let fps = timer.tick();
        telemetry.observe(&TickTelemetry {
            frame_index: frame.index,
            fps,
            report: &report,
        });
    };

    sink.finish()?;

    let stats = controller.stats();
    let summary = RunSummary {
        frames_read,
        frames_emitted,
        reacquisitions: stats.reacquisitions,
        tracker_failures: stats.tracker_failures,
        init_failures: stats.init_failures,
        end,
        elapsed: clock.elapsed(),
    };

    tracing::info!(
        frames_read = summary.frames_read,
        frames_emitted = summary.frames_emitted,
        reacquisitions = summary.reacquisitions,
        tracker_failures = summary.tracker_failures,
        end = ?summary.end,
        avg_fps = format!("{:.1}", summary.average_fps()),
        "follow run finished"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_source_counts_and_shares() {
        let mut source = BlankFrameSource::new(FrameSize::new(4, 4), Some(3)).starting_at(10);
        let a = source.next_frame().unwrap().unwrap();
        let b = source.next_frame().unwrap().unwrap();
        assert_eq!(a.index, 10);
        assert_eq!(b.index, 11);
        assert_eq!(a.data().as_ptr(), b.data().as_ptr());
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_endless_blank_source() {
        let mut source = BlankFrameSource::new(FrameSize::new(1, 1), None);
        for expected in 0..100 {
            assert_eq!(source.next_frame().unwrap().unwrap().index, expected);
        }
    }
}
