//! pose-cycle: gesture-cycle detection, gated capture and playback.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use pose_cycle::{
    app::{run_analyze, run_play, run_record},
    cli::{Args, Command},
    config::{Config, EXAMPLE_CONFIG},
};

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    // Load configuration if provided
    let config = if let Some(config_path) = &args.config {
        info!("Loading configuration from: {}", config_path.display());
        match Config::from_file(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Failed to load config file: {}. Using defaults.", e);
                Config::default()
            }
        }
    } else {
        Config::default()
    };
    config.validate().context("invalid configuration")?;

    match args.command {
        Command::Record {
            input,
            name,
            exercise,
            weight,
        } => {
            let written = run_record(&config, &input, &name, exercise.as_deref(), weight.as_deref())
                .with_context(|| format!("recording from {}", input.display()))?;
            info!("{} frames recorded", written);
        }
        Command::Play { file, rate, reverse } => {
            let rendered = run_play(&config, &file, rate, reverse)
                .with_context(|| format!("playing {}", file.display()))?;
            info!("{} frames played", rendered);
        }
        Command::Analyze { file } => {
            let cycles = run_analyze(&config, &file).with_context(|| format!("analysing {}", file.display()))?;
            println!("{cycles}");
        }
        Command::Config => print!("{EXAMPLE_CONFIG}"),
    }

    Ok(())
}
