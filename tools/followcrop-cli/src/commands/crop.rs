//! Crop a raw RGB24 stream around a tracked subject.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use followcrop_common::config::AppConfig;
use followcrop_frame_model::{FrameSize, RawFrameReader, RawFrameWriter};
use followcrop_stabilizer::pipeline::{CropSink, FrameCropSink, PlanSink, TeeSink};
use followcrop_stabilizer::replay::ReplayTracker;
use followcrop_stabilizer::telemetry::LogTelemetry;
use followcrop_stabilizer::{run_pipeline, StabilizationController};

use super::StabilizerArgs;

#[derive(Args, Debug)]
pub struct CropArgs {
    /// Raw RGB24 input stream
    #[arg(short, long)]
    pub input: PathBuf,

    /// Input frame width
    #[arg(long)]
    pub width: u32,

    /// Input frame height
    #[arg(long)]
    pub height: u32,

    /// Track log (JSONL, one `{"frame", "bbox"}` per line)
    #[arg(short, long)]
    pub track: PathBuf,

    /// Raw RGB24 output stream of cropped frames
    #[arg(short, long)]
    pub output: PathBuf,

    /// Selection script answering re-acquisition requests
    #[arg(long, required_unless_present = "reacquire_from_track")]
    pub selections: Option<PathBuf>,

    /// Re-acquire from the next sighting in the track log
    #[arg(long, conflicts_with = "selections")]
    pub reacquire_from_track: bool,

    /// Skip this many input frames before following
    #[arg(long, default_value = "0")]
    pub start_frame: u64,

    /// Also write the crop plan (JSONL) here
    #[arg(long)]
    pub plan: Option<PathBuf>,

    #[command(flatten)]
    pub stabilizer: StabilizerArgs,
}

pub async fn run(args: CropArgs, app: AppConfig) -> anyhow::Result<()> {
    let config = args.stabilizer.resolve(&app.stabilizer);
    let size = FrameSize::new(args.width, args.height);

    println!("Cropping: {}", args.input.display());
    println!("  Frame: {}x{}", size.width, size.height);
    println!(
        "  Crop: {}x{} (margins {}, {}; rate {})",
        config.output.width,
        config.output.height,
        config.margin_x,
        config.margin_y,
        config.smoothing_rate
    );
    config
        .validate_for(size)
        .context("Configuration does not fit the input frames")?;

    let track = super::load_track(&args.track)?;
    println!("  Track log: {} ({} records)", args.track.display(), track.len());
    let reacquirer = super::reacquirer(args.selections.as_deref(), &track)?;
    let mut controller =
        StabilizationController::new(config, ReplayTracker::from_records(&track), reacquirer)?;

    super::require_file(&args.input)?;
    let mut reader = RawFrameReader::open(&args.input, size)
        .with_context(|| format!("Failed to open input {}", args.input.display()))?;
    if args.start_frame > 0 {
        let skipped = reader.skip(args.start_frame)?;
        if skipped < args.start_frame {
            anyhow::bail!(
                "Input ends after {skipped} frames, before start frame {}",
                args.start_frame
            );
        }
        println!("  Skipped: {skipped} frames");
    }

    let frames = FrameCropSink::new(
        RawFrameWriter::create(&args.output)
            .with_context(|| format!("Failed to create output {}", args.output.display()))?,
    );
    let mut sink: Box<dyn CropSink + Send> = match &args.plan {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create plan {}", path.display()))?;
            Box::new(TeeSink::new(frames, PlanSink::new(BufWriter::new(file))))
        }
        None => Box::new(frames),
    };

    println!("Press Ctrl+C to stop...");

    let cancel = super::cancel_on_ctrl_c();
    let mut telemetry = LogTelemetry::from_defaults(&app.telemetry);
    let summary = tokio::task::spawn_blocking(move || {
        run_pipeline(
            &mut reader,
            &mut controller,
            sink.as_mut(),
            &mut telemetry,
            &cancel,
        )
    })
    .await??;

    super::print_summary(&summary);
    println!("\nCropped frames written to: {}", args.output.display());
    if let Some(plan) = &args.plan {
        println!("Crop plan written to: {}", plan.display());
    }

    Ok(())
}
