use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};

use followcrop_common::error::FollowcropError;
use followcrop_frame_model::{
    frame_len, parse_jsonl, BoundingBox, ControllerState, CropPlanRecord, Frame, FrameSize,
    OutputSize, RawFrameReader, TrackRecord,
};
use followcrop_stabilizer::pipeline::{
    BlankFrameSource, CropSink, FrameCropSink, FrameSource, PlanSink, TeeSink,
};
use followcrop_stabilizer::replay::{ReplayTracker, TrackLogReacquirer};
use followcrop_stabilizer::telemetry::{NoopTelemetry, Telemetry, TickTelemetry};
use followcrop_stabilizer::{
    run_pipeline, EndReason, StabilizationController, StabilizerConfig, TickReport,
};

const W: u32 = 64;
const H: u32 = 32;

fn small_config() -> StabilizerConfig {
    StabilizerConfig {
        margin_x: 8.0,
        margin_y: 4.0,
        output: OutputSize::new(16, 24),
        smoothing_rate: 2.0,
        reset_on_reacquire: false,
    }
}

/// Raw stream where every pixel's red channel is its x coordinate.
fn raw_stream(frames: u64) -> Vec<u8> {
    let mut one = Vec::with_capacity(frame_len(W, H));
    for _y in 0..H {
        for x in 0..W {
            one.extend_from_slice(&[x as u8, 0, 0]);
        }
    }
    (0..frames).flat_map(|_| one.clone()).collect()
}

fn log(centres: &[Option<f64>]) -> Vec<TrackRecord> {
    centres
        .iter()
        .enumerate()
        .map(|(i, cx)| TrackRecord {
            frame: i as u64,
            bbox: cx.map(|cx| BoundingBox::from_corners(cx - 2.0, 10.0, cx + 2.0, 14.0)),
        })
        .collect()
}

fn controller(
    records: &[TrackRecord],
) -> StabilizationController<ReplayTracker, TrackLogReacquirer> {
    StabilizationController::new(
        small_config(),
        ReplayTracker::from_records(records),
        TrackLogReacquirer::from_records(records),
    )
    .unwrap()
}

#[test]
fn crops_follow_the_target_across_a_raw_stream() {
    let records = log(&[Some(20.0), Some(40.0), Some(40.0), Some(40.0)]);
    let mut source = RawFrameReader::new(Cursor::new(raw_stream(4)), FrameSize::new(W, H));
    let mut controller = controller(&records);
    let mut sink = FrameCropSink::new(Vec::<Frame>::new());
    let cancel = AtomicBool::new(false);

    let summary = run_pipeline(
        &mut source,
        &mut controller,
        &mut sink,
        &mut NoopTelemetry,
        &cancel,
    )
    .unwrap();

    assert_eq!(summary.end, EndReason::SourceExhausted);
    assert_eq!(summary.frames_read, 4);
    assert_eq!(summary.frames_emitted, 4);
    assert_eq!(summary.reacquisitions, 1);

    let frames = sink.into_inner();
    // origin x: 12, then 12 + trunc(20 / 2) = 22, 27, 29
    let left_edges: Vec<u8> = frames.iter().map(|f| f.pixel(0, 0).unwrap()[0]).collect();
    assert_eq!(left_edges, vec![12, 22, 27, 29]);
    for frame in &frames {
        assert_eq!(frame.size(), FrameSize::new(16, 24));
    }
}

#[test]
fn abort_ends_run_without_error() {
    let records = log(&[Some(20.0), None, None]);
    let mut source = BlankFrameSource::new(FrameSize::new(W, H), Some(3));
    let mut controller = controller(&records);
    let mut sink = PlanSink::new(Vec::new());
    let cancel = AtomicBool::new(false);

    let summary = run_pipeline(
        &mut source,
        &mut controller,
        &mut sink,
        &mut NoopTelemetry,
        &cancel,
    )
    .unwrap();

    assert_eq!(summary.end, EndReason::Aborted);
    assert_eq!(summary.frames_read, 2);
    assert_eq!(summary.frames_emitted, 1);
    assert_eq!(summary.tracker_failures, 1);
    assert_eq!(sink.records(), 1);
}

#[test]
fn plan_records_match_emitted_windows() {
    let records = log(&[Some(20.0), None, Some(30.0), Some(30.0)]);
    let mut source = BlankFrameSource::new(FrameSize::new(W, H), Some(4));
    let mut controller = controller(&records);
    let mut sink = PlanSink::new(Vec::new());
    let cancel = AtomicBool::new(false);

    run_pipeline(
        &mut source,
        &mut controller,
        &mut sink,
        &mut NoopTelemetry,
        &cancel,
    )
    .unwrap();

    let jsonl = String::from_utf8(sink.into_inner()).unwrap();
    let plan: Vec<CropPlanRecord> = parse_jsonl(&jsonl).unwrap();

    assert_eq!(plan.len(), 4);
    assert_eq!(plan.iter().map(|p| p.frame).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert!(plan[0].reacquired);
    assert!(plan[1].reacquired);
    assert!(!plan[2].reacquired);
    assert!(plan.iter().all(|p| p.state == ControllerState::Tracking));
    assert!(plan.iter().all(|p| p.width == 16 && p.height == 24));
    assert!(plan.iter().all(|p| p.x >= 0 && p.x <= 48 && p.y >= 0 && p.y <= 8));
}

#[test]
fn oversized_output_fails_before_first_tick() {
    let records = log(&[Some(20.0)]);
    let mut source = BlankFrameSource::new(FrameSize::new(W, H), Some(1));
    let mut controller = StabilizationController::new(
        StabilizerConfig {
            output: OutputSize::new(80, 24),
            ..small_config()
        },
        ReplayTracker::from_records(&records),
        TrackLogReacquirer::from_records(&records),
    )
    .unwrap();
    let mut sink = PlanSink::new(Vec::new());
    let cancel = AtomicBool::new(false);

    let err = run_pipeline(
        &mut source,
        &mut controller,
        &mut sink,
        &mut NoopTelemetry,
        &cancel,
    )
    .unwrap_err();

    assert!(matches!(err, FollowcropError::OutOfBounds { .. }));
    assert_eq!(controller.state(), ControllerState::Uninitialized);
    assert_eq!(sink.records(), 0);
}

#[test]
fn raised_cancel_flag_stops_before_reading() {
    let records = log(&[Some(20.0)]);
    let mut source = BlankFrameSource::new(FrameSize::new(W, H), None);
    let mut controller = controller(&records);
    let mut sink = PlanSink::new(Vec::new());
    let cancel = AtomicBool::new(true);

    let summary = run_pipeline(
        &mut source,
        &mut controller,
        &mut sink,
        &mut NoopTelemetry,
        &cancel,
    )
    .unwrap();

    assert_eq!(summary.end, EndReason::Cancelled);
    assert_eq!(summary.frames_read, 0);
}

/// Raises the cancel flag once `after` crops have been observed.
struct CancelAfter<'a> {
    after: u64,
    seen: u64,
    cancel: &'a AtomicBool,
}

impl Telemetry for CancelAfter<'_> {
    fn observe(&mut self, _tick: &TickTelemetry<'_>) {
        self.seen += 1;
        if self.seen >= self.after {
            self.cancel.store(true, Ordering::Relaxed);
        }
    }
}

#[test]
fn cancellation_is_honoured_at_tick_boundary() {
    let records = log(&[Some(20.0); 10]);
    let mut source = BlankFrameSource::new(FrameSize::new(W, H), None);
    let mut controller = controller(&records);
    let mut sink = PlanSink::new(Vec::new());
    let cancel = AtomicBool::new(false);
    let mut telemetry = CancelAfter {
        after: 3,
        seen: 0,
        cancel: &cancel,
    };

    let summary = run_pipeline(
        &mut source,
        &mut controller,
        &mut sink,
        &mut telemetry,
        &cancel,
    )
    .unwrap();

    assert_eq!(summary.end, EndReason::Cancelled);
    assert_eq!(summary.frames_emitted, 3);
}

/// Source whose frames change size after the first.
struct ShrinkingSource(u64);

impl FrameSource for ShrinkingSource {
    fn next_frame(&mut self) -> followcrop_common::error::FollowcropResult<Option<Frame>> {
        let index = self.0;
        self.0 += 1;
        let width = if index == 0 { W } else { W / 2 };
        Ok(Some(Frame::blank(index, width, H)))
    }
}

#[test]
fn frame_size_change_mid_stream_is_an_error() {
    let records = log(&[Some(20.0), Some(20.0)]);
    let mut controller = controller(&records);
    let mut sink = PlanSink::new(Vec::new());
    let cancel = AtomicBool::new(false);

    let err = run_pipeline(
        &mut ShrinkingSource(0),
        &mut controller,
        &mut sink,
        &mut NoopTelemetry,
        &cancel,
    )
    .unwrap_err();
    assert!(matches!(err, FollowcropError::Frame { .. }));
}

/// Counts emits on both sides of a tee.
#[derive(Default)]
struct Counting(u64);

impl CropSink for Counting {
    fn emit(
        &mut self,
        _frame: &Frame,
        _report: &TickReport,
    ) -> followcrop_common::error::FollowcropResult<()> {
        self.0 += 1;
        Ok(())
    }
}

#[test]
fn tee_sink_feeds_both_outputs() {
    let records = log(&[Some(20.0), Some(22.0)]);
    let mut source = BlankFrameSource::new(FrameSize::new(W, H), Some(2));
    let mut controller = controller(&records);
    let mut sink = TeeSink::new(Counting::default(), PlanSink::new(Vec::new()));
    let cancel = AtomicBool::new(false);

    run_pipeline(
        &mut source,
        &mut controller,
        &mut sink,
        &mut NoopTelemetry,
        &cancel,
    )
    .unwrap();

    let (counting, plan) = sink.into_parts();
    assert_eq!(counting.0, 2);
    assert_eq!(plan.records(), 2);
}
