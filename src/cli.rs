//! Command-line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Jumping-jack cycle detection, gated recording and playback
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Feed a recording through the capture pipeline as if it were live
    Record {
        /// Recording replayed as the sensor stream
        #[arg(short, long)]
        input: PathBuf,

        /// Name of the new recording
        #[arg(short, long)]
        name: String,

        /// Exercise label appended to the name
        #[arg(short, long)]
        exercise: Option<String>,

        /// Weight label appended to the name
        #[arg(short, long)]
        weight: Option<String>,
    },

    /// Play a recording
    Play {
        /// Recording to play
        #[arg(short, long)]
        file: PathBuf,

        /// Frames per second
        #[arg(short, long)]
        rate: Option<f64>,

        /// Play from the end towards the start
        #[arg(long)]
        reverse: bool,
    },

    /// Scrub through a recording and count its cycles
    Analyze {
        /// Recording to analyse
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print an example configuration
    Config,
}
