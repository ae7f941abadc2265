//! CLI Module
//!
//! Command-line interface for the babble and subliminal generators.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Murmur - layered audio synthesis
#[derive(Parser, Debug)]
#[command(name = "murmur")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON config file; command-line flags override its values
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a "babbling crowd" effect from a single audio file
    Babble(BabbleArgs),

    /// Create a subliminal track from an affirmations file and a background
    Subliminal(SubliminalArgs),
}

#[derive(Args, Debug)]
pub struct BabbleArgs {
    /// Path to the source audio file (e.g. speech.wav)
    pub input_file: PathBuf,

    /// Path to save the output audio file (e.g. crowd.wav)
    pub output_file: PathBuf,

    /// Number of voices in the crowd [default: 15]
    #[arg(short = 'n', long)]
    pub voices: Option<usize>,

    /// Maximum start delay in milliseconds [default: 2500]
    #[arg(short, long)]
    pub delay: Option<u32>,

    /// Minimum volume reduction in dB (quieter voices) [default: 15]
    #[arg(long = "min-vol")]
    pub min_vol: Option<f32>,

    /// Maximum volume reduction in dB (louder voices) [default: 5]
    #[arg(long = "max-vol")]
    pub max_vol: Option<f32>,

    /// Maximum pitch variation (e.g. 0.08 for +/- 8%) [default: 0.08]
    #[arg(short, long)]
    pub pitch: Option<f64>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct SubliminalArgs {
    /// Title for your subliminal (output file name)
    #[arg(short, long)]
    pub title: String,

    /// Text file of the affirmations for your subliminal
    #[arg(short, long)]
    pub affs: PathBuf,

    /// Background audio file for your subliminal
    #[arg(short, long)]
    pub bg: PathBuf,

    /// Image file for your subliminal (video output is not supported)
    #[arg(short, long)]
    pub img: Option<PathBuf>,

    /// Times the affirmation block is repeated [default: 8]
    #[arg(short, long)]
    pub repetitions: Option<usize>,

    /// Directory the finished track is written to
    #[arg(long, default_value = "subliminals/audios")]
    pub out_dir: PathBuf,

    /// Language for speech synthesis [default: en]
    #[arg(long)]
    pub language: Option<String>,

    /// Speech synthesizer program (espeak-compatible arguments)
    #[arg(long, default_value = "espeak-ng")]
    pub tts_program: String,
}
