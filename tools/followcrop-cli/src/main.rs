//! FollowCrop CLI: run the follow-crop stabilizer over recorded footage.
//!
//! Usage:
//!   followcrop crop [OPTIONS]       Crop a raw RGB24 stream around a tracked subject
//!   followcrop plan [OPTIONS]       Write the crop-window plan for a track log
//!   followcrop validate [OPTIONS]   Check the configuration against a frame size
//!   followcrop config [--save]      Show (and optionally save) the configuration

use clap::{Parser, Subcommand};
use followcrop_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "followcrop",
    about = "Virtual camera that follows a tracked subject with a smoothed crop",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop every frame of a raw RGB24 stream
    Crop(commands::crop::CropArgs),

    /// Produce the per-frame crop plan without touching pixels
    Plan(commands::plan::PlanArgs),

    /// Check the effective configuration against a frame size
    Validate(commands::validate::ValidateArgs),

    /// Print the effective configuration
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app = AppConfig::load();

    // Initialize logging
    let mut logging = app.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    followcrop_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Crop(args) => commands::crop::run(args, app).await,
        Commands::Plan(args) => commands::plan::run(args, app).await,
        Commands::Validate(args) => commands::validate::run(args, &app),
        Commands::Config(args) => commands::config::run(args, app),
    }
}
