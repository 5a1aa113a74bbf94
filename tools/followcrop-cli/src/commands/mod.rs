//! Subcommand implementations and the flags they share.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use followcrop_common::config::StabilizerDefaults;
use followcrop_common::error::FollowcropError;
use followcrop_frame_model::{load_jsonl, OutputSize, SelectionRecord, TrackRecord};
use followcrop_stabilizer::replay::{ScriptedReacquirer, TrackLogReacquirer};
use followcrop_stabilizer::{Reacquirer, RunSummary, StabilizerConfig};

pub mod config;
pub mod crop;
pub mod plan;
pub mod validate;

/// Overrides for the configured stabilizer parameters.
#[derive(Args, Debug, Clone, Default)]
pub struct StabilizerArgs {
    /// Start from the 994x1080 wide preset instead of the configured values
    #[arg(long)]
    pub wide: bool,

    /// Distance from the subject's horizontal centre to the crop's left edge
    #[arg(long)]
    pub margin_x: Option<f64>,

    /// Distance from the subject's top edge to the crop's top edge
    #[arg(long)]
    pub margin_y: Option<f64>,

    /// Crop width in pixels
    #[arg(long)]
    pub out_width: Option<u32>,

    /// Crop height in pixels
    #[arg(long)]
    pub out_height: Option<u32>,

    /// Smoothing rate (1 = follow instantly, larger = slower)
    #[arg(long)]
    pub rate: Option<f64>,

    /// Snap onto the subject after every re-acquisition
    #[arg(long)]
    pub reset_on_reacquire: bool,
}

impl StabilizerArgs {
    /// Apply the flags on top of the configured defaults.
    pub fn resolve(&self, defaults: &StabilizerDefaults) -> StabilizerConfig {
        let mut config = if self.wide {
            StabilizerConfig::wide_preset()
        } else {
            StabilizerConfig::from(defaults)
        };

        if let Some(margin_x) = self.margin_x {
            config.margin_x = margin_x;
        }
        if let Some(margin_y) = self.margin_y {
            config.margin_y = margin_y;
        }
        config.output = OutputSize::new(
            self.out_width.unwrap_or(config.output.width),
            self.out_height.unwrap_or(config.output.height),
        );
        if let Some(rate) = self.rate {
            config.smoothing_rate = rate;
        }
        if self.reset_on_reacquire {
            config.reset_on_reacquire = true;
        }
        config
    }
}

/// Flag raised when the user presses Ctrl+C.
///
/// The pipeline checks it between frames.
pub fn cancel_on_ctrl_c() -> Arc<AtomicBool> {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping after the current frame");
            flag.store(true, Ordering::Relaxed);
        }
    });
    cancel
}

/// Fail early with a clear message when an input file is missing.
pub fn require_file(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        return Err(FollowcropError::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    Ok(())
}

pub fn load_track(path: &Path) -> anyhow::Result<Vec<TrackRecord>> {
    require_file(path)?;
    load_jsonl(path).with_context(|| format!("Failed to load track log {}", path.display()))
}

/// Pick the re-acquisition source: a selection script when given, else the
/// track log itself.
pub fn reacquirer(
    selections: Option<&Path>,
    track: &[TrackRecord],
) -> anyhow::Result<Box<dyn Reacquirer + Send>> {
    match selections {
        Some(path) => {
            require_file(path)?;
            let records: Vec<SelectionRecord> = load_jsonl(path)
                .with_context(|| format!("Failed to load selections {}", path.display()))?;
            println!("  Selections: {} ({} entries)", path.display(), records.len());
            Ok(Box::new(ScriptedReacquirer::from_records(&records)))
        }
        None => {
            println!("  Selections: re-acquire from track log");
            Ok(Box::new(TrackLogReacquirer::from_records(track)))
        }
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("  Frames read: {}", summary.frames_read);
    println!("  Crops emitted: {}", summary.frames_emitted);
    println!("  Re-acquisitions: {}", summary.reacquisitions);
    println!("  Tracker failures: {}", summary.tracker_failures);
    if summary.init_failures > 0 {
        println!("  Tracker init failures: {}", summary.init_failures);
    }
    println!("  Average FPS: {:.1}", summary.average_fps());
    println!("  Ended: {:?}", summary.end);
}
