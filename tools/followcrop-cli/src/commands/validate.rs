//! Check the effective configuration against a frame size.

use clap::Args;
use followcrop_common::config::AppConfig;
use followcrop_frame_model::FrameSize;

use super::StabilizerArgs;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Source frame width
    #[arg(long)]
    pub width: u32,

    /// Source frame height
    #[arg(long)]
    pub height: u32,

    #[command(flatten)]
    pub stabilizer: StabilizerArgs,
}

pub fn run(args: ValidateArgs, app: &AppConfig) -> anyhow::Result<()> {
    let config = args.stabilizer.resolve(&app.stabilizer);
    let frame = FrameSize::new(args.width, args.height);

    println!("Validating against {}x{} frames", frame.width, frame.height);
    println!("  Crop: {}x{}", config.output.width, config.output.height);
    println!("  Margins: {}, {}", config.margin_x, config.margin_y);
    println!("  Smoothing rate: {}", config.smoothing_rate);
    println!("  Reset on re-acquire: {}", config.reset_on_reacquire);

    match config.validate_for(frame) {
        Ok(()) => {
            if let Some(max) = config.output.max_origin(frame) {
                println!("  Window origin range: x 0..={}, y 0..={}", max.x, max.y);
            }
            println!("\nConfiguration is valid.");
            Ok(())
        }
        Err(e) => {
            println!("\nConfiguration is invalid: {e}");
            Err(e.into())
        }
    }
}
