//! `tutorseq` application entry point.
//!
//! Drives headless tutorial sessions and manages persisted tutorial progress.
//! It uses `eyre` for opaque error handling at the application boundary,
//! converting domain-specific errors into human-readable reports.
//!
//! Configuration is loaded with layered precedence via `OrthoConfig`:
//! 1. Application defaults
//! 2. Configuration file (`~/.config/tutorseq/config.toml` or path from `TUTORSEQ_CONFIG_PATH`)
//! 3. Environment variables (`TUTORSEQ_*`)
//! 4. Command-line arguments
//!
//! Log output goes to stderr and is filtered by `RUST_LOG` (default `info`).

use std::time::Duration;

use clap::Parser;
use eyre::{Report, Result as EyreResult};
use tracing_subscriber::EnvFilter;
use tutorial_sequencer::api::{self, SimulationReport, SimulationScript};
use tutorial_sequencer::config::{AppConfig, Cli, Commands, SimulateArgs, load_config};
use tutorial_sequencer::error::Result as TutorialResult;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Application entry point.
///
/// Loads configuration with layered precedence, then dispatches to the
/// subcommand handler.
fn main() -> EyreResult<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(&cli).map_err(Report::from)?;
    run(&cli, &config).map_err(Report::from)
}

/// Execute the CLI command, returning domain-specific errors.
fn run(cli: &Cli, config: &AppConfig) -> TutorialResult<()> {
    match &cli.command {
        Commands::Simulate(args) => simulate(config, args),
        Commands::Progress => show_progress(config),
        Commands::Reset => api::reset_progress(config),
    }
}

/// Run one tutorial session headlessly and print its outcome.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn simulate(config: &AppConfig, args: &SimulateArgs) -> TutorialResult<()> {
    let script = SimulationScript {
        tutorial: args.tutorial,
        advance: args.advance,
        back: args.back,
        dwell: Duration::from_secs(args.seconds),
        finish: args.finish,
    };
    let SimulationReport {
        tutorial,
        previously_completed,
        began,
        step,
        step_count,
        completion,
    } = api::simulate(config, &script)?;

    if !began {
        println!("{tutorial} tutorial did not start");
        return Ok(());
    }
    if previously_completed {
        println!("{tutorial} tutorial was already completed before this run");
    }
    if let Some(index) = step {
        println!("{tutorial} tutorial on step {} of {step_count}", index.saturating_add(1));
    }
    match completion {
        Some(elapsed) => println!(
            "{tutorial} tutorial completed after {}.{:03}s",
            elapsed.as_secs(),
            elapsed.subsec_millis()
        ),
        None => println!("{tutorial} tutorial left running"),
    }
    Ok(())
}

/// Print every tutorial's completion flag.
#[expect(clippy::print_stdout, reason = "CLI output is the intended behaviour")]
fn show_progress(config: &AppConfig) -> TutorialResult<()> {
    for (tutorial, done) in api::progress(config)? {
        let mark = if done { "completed" } else { "not completed" };
        println!("{tutorial:<16} {mark}");
    }
    Ok(())
}
