//! Show (and optionally save) the effective configuration.

use clap::Args;
use followcrop_common::config::{config_file_path, AppConfig, StabilizerDefaults};

use super::StabilizerArgs;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the effective configuration to the config file
    #[arg(long)]
    pub save: bool,

    #[command(flatten)]
    pub stabilizer: StabilizerArgs,
}

pub fn run(args: ConfigArgs, mut app: AppConfig) -> anyhow::Result<()> {
    let config = args.stabilizer.resolve(&app.stabilizer);
    config.validate()?;
    app.stabilizer = StabilizerDefaults::from(&config);

    println!("Config file: {}", config_file_path().display());
    println!("{}", serde_json::to_string_pretty(&app)?);

    if args.save {
        let path = app.save()?;
        println!("\nConfiguration saved to: {}", path.display());
    }

    Ok(())
}
