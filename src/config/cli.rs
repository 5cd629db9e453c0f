//! Command-line argument definitions for tutorseq.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

use crate::api::FinishMode;
use crate::tutorial::TutorialType;

/// Command-line interface for tutorseq.
#[derive(Debug, Parser)]
#[command(name = "tutorseq")]
#[command(
    author,
    version,
    about = "Drive in-game tutorial sessions and inspect their progress"
)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// File holding the tutorial completion flags.
    #[arg(long, global = true)]
    pub progress_path: Option<String>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run one tutorial session headlessly and report its outcome.
    Simulate(SimulateArgs),

    /// Show which tutorials have been completed.
    Progress,

    /// Clear every completion flag.
    Reset,
}

/// Arguments for the `simulate` subcommand.
#[derive(Debug, Parser)]
pub struct SimulateArgs {
    /// Tutorial to run.
    #[arg(long, value_enum, required = true)]
    pub tutorial: TutorialType,

    /// Number of times to advance to the next step.
    #[arg(long, default_value_t = 0)]
    pub advance: usize,

    /// Number of times to step back after advancing.
    #[arg(long, default_value_t = 0)]
    pub back: usize,

    /// Seconds the player spends in the tutorial before finishing it.
    #[arg(long, default_value_t = 0)]
    pub seconds: u64,

    /// How the session finishes.
    #[arg(long, value_enum, default_value_t = FinishMode::Work)]
    pub finish: FinishMode,
}
