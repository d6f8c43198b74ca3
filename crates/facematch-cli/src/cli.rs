use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "facematch",
    version,
    about = "Score selfie and identity-document faces from detector landmarks"
)]
pub struct Cli {
    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Read configuration from this file instead of the system locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare the selfie face against the document face
    Compare(CompareArgs),
    /// Check whether a single selfie frame is usable
    Quality(QualityArgs),
    /// Replay a capture session through the blink and head-turn challenges
    Liveness(LivenessArgs),
    /// Validate configuration and scoring parameters
    Doctor,
}

#[derive(Debug, Clone, Args)]
pub struct CompareArgs {
    /// Detector output for the selfie image
    #[arg(long, value_name = "PATH")]
    pub selfie: PathBuf,

    /// Detector output for the document photo
    #[arg(long, value_name = "PATH")]
    pub document: PathBuf,

    /// Override the acceptance threshold (0.0 - 1.0)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Override the message locale ("en" or "pt-BR")
    #[arg(long)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct QualityArgs {
    /// Detector output for one camera frame
    #[arg(long, value_name = "PATH")]
    pub detection: PathBuf,

    #[arg(long, value_name = "PIXELS")]
    pub frame_width: u32,

    #[arg(long, value_name = "PIXELS")]
    pub frame_height: u32,
}

#[derive(Debug, Clone, Args)]
pub struct LivenessArgs {
    /// Capture session with per-frame detector output
    #[arg(long, value_name = "PATH")]
    pub session: PathBuf,

    /// Frames dropped between analysed frames
    #[arg(long)]
    pub frame_skip: Option<u32>,

    /// Include per-frame reports in JSON output
    #[arg(long)]
    pub frames: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}
