//! Orchestration API for tutorseq commands.
//!
//! Each command has a library function here so the CLI binary stays a thin
//! adapter: [`simulate`] replays a scripted session against logging UI
//! adapters, [`progress`] lists completion flags and [`reset_progress`]
//! clears them. None of these functions print to stdout or stderr.

mod console;
mod simulate;

use std::collections::BTreeMap;
use std::sync::Arc;

use camino::Utf8PathBuf;
use mockable::DefaultEnv;
use tokio::runtime::Builder;
use tracing::info;

pub use simulate::{FinishMode, SimulationReport, SimulationScript, run_simulation};

use crate::config::AppConfig;
use crate::error::{ConfigError, Result, TutorialError};
use crate::progress::{ProgressStore, TomlProgressStore, default_progress_path};
use crate::session::SessionSettings;
use crate::tutorial::TutorialType;

/// Opens the progress file named by the configuration, falling back to the
/// user data directory.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when no path is configured and
/// neither `XDG_DATA_HOME` nor `HOME` is set.
pub fn open_progress_store(config: &AppConfig) -> Result<TomlProgressStore> {
    let path = config
        .progress_path
        .as_deref()
        .map(Utf8PathBuf::from)
        .or_else(|| default_progress_path(&DefaultEnv::new()))
        .ok_or_else(|| ConfigError::InvalidValue {
            field: String::from("progress_path"),
            reason: String::from("not set and no data directory could be resolved"),
        })?;
    Ok(TomlProgressStore::new(path))
}

/// Runs one scripted tutorial session to completion.
///
/// Builds a runtime for the run, so this must not be called from async
/// code; use [`run_simulation`] there.
///
/// # Errors
///
/// Returns an error when the runtime cannot be created, the progress store
/// fails to open or read, or the session cannot be driven.
pub fn simulate(config: &AppConfig, script: &SimulationScript) -> Result<SimulationReport> {
    let progress: Arc<dyn ProgressStore> = Arc::new(open_progress_store(config)?);
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| TutorialError::Runtime {
            message: e.to_string(),
        })?;
    runtime.block_on(run_simulation(
        progress,
        SessionSettings::from(config),
        script,
    ))
}

/// Reads every completion flag.
///
/// # Errors
///
/// Returns an error when the progress file cannot be resolved or read.
pub fn progress(config: &AppConfig) -> Result<BTreeMap<TutorialType, bool>> {
    Ok(open_progress_store(config)?.snapshot()?)
}

/// Clears every completion flag.
///
/// # Errors
///
/// Returns an error when the progress file cannot be resolved or written.
pub fn reset_progress(config: &AppConfig) -> Result<()> {
    let store = open_progress_store(config)?;
    store.reset()?;
    info!(path = %store.path(), "tutorial progress reset");
    Ok(())
}
