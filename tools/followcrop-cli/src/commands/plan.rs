//! Produce the crop-window plan for a track log without reading pixels.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use followcrop_common::config::AppConfig;
use followcrop_frame_model::FrameSize;
use followcrop_stabilizer::pipeline::{BlankFrameSource, PlanSink};
use followcrop_stabilizer::replay::ReplayTracker;
use followcrop_stabilizer::telemetry::LogTelemetry;
use followcrop_stabilizer::{run_pipeline, StabilizationController};

use super::StabilizerArgs;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Track log (JSONL, one `{"frame", "bbox"}` per line)
    #[arg(short, long)]
    pub track: PathBuf,

    /// Source frame width
    #[arg(long)]
    pub width: u32,

    /// Source frame height
    #[arg(long)]
    pub height: u32,

    /// Number of frames to plan (defaults to the last logged frame + 1)
    #[arg(long)]
    pub frames: Option<u64>,

    /// Selection script answering re-acquisition requests
    /// (defaults to the next sighting in the track log)
    #[arg(long)]
    pub selections: Option<PathBuf>,

    /// Crop plan output (JSONL)
    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub stabilizer: StabilizerArgs,
}

pub async fn run(args: PlanArgs, app: AppConfig) -> anyhow::Result<()> {
    let config = args.stabilizer.resolve(&app.stabilizer);
    let size = FrameSize::new(args.width, args.height);

    println!("Planning: {}", args.track.display());
    config
        .validate_for(size)
        .context("Configuration does not fit the source frames")?;

    let track = super::load_track(&args.track)?;
    let tracker = ReplayTracker::from_records(&track);
    let frames = args
        .frames
        .unwrap_or_else(|| tracker.last_frame().map_or(0, |last| last + 1));
    println!("  Track log: {} records", track.len());
    println!("  Frames: {frames}");

    let reacquirer = super::reacquirer(args.selections.as_deref(), &track)?;
    let mut controller = StabilizationController::new(config, tracker, reacquirer)?;

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create plan {}", args.output.display()))?;
    let mut sink = PlanSink::new(BufWriter::new(file));
    let mut source = BlankFrameSource::new(size, Some(frames));

    let cancel = super::cancel_on_ctrl_c();
    let mut telemetry = LogTelemetry::from_defaults(&app.telemetry);
    let summary = tokio::task::spawn_blocking(move || {
        run_pipeline(
            &mut source,
            &mut controller,
            &mut sink,
            &mut telemetry,
            &cancel,
        )
    })
    .await??;

    super::print_summary(&summary);
    println!("\nCrop plan written to: {}", args.output.display());

    Ok(())
}
