//! Semantic error types for the tutorial sequencer.
//!
//! Conditions a caller might inspect (a navigation request at the edge of a
//! step list, a second start while a session runs) are modelled as `thiserror`
//! enums. Opaque `eyre::Report` values are reserved for the binary boundary.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::tutorial::TutorialType;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be parsed.
    #[error("failed to parse configuration file: {message}")]
    ParseError {
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// The name of the invalid field.
        field: String,
        /// The reason the value is invalid.
        reason: String,
    },

    /// The `OrthoConfig` library returned an error during configuration loading.
    #[error("configuration loading failed: {0}")]
    OrthoConfig(Arc<ortho_config::OrthoError>),
}

/// Errors raised by the session controller and the step registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequencerError {
    /// Navigation was requested while no tutorial is running.
    #[error("no tutorial session is active")]
    NoActiveSession,

    /// A tutorial was started while another one is still running.
    #[error("cannot start {requested} tutorial while {active} tutorial is active")]
    SessionAlreadyActive {
        /// The tutorial that is currently running.
        active: TutorialType,
        /// The tutorial that was requested.
        requested: TutorialType,
    },

    /// Navigation would move the cursor outside the step list.
    #[error("step {index} is out of range for {tutorial} tutorial ({len} steps)")]
    StepOutOfRange {
        /// The tutorial whose steps were navigated.
        tutorial: TutorialType,
        /// The index navigation would have landed on.
        index: isize,
        /// Number of steps registered for the tutorial.
        len: usize,
    },

    /// The tutorial has no registered step sequence.
    #[error("no steps are registered for {tutorial} tutorial")]
    NoSteps {
        /// The tutorial that was looked up.
        tutorial: TutorialType,
    },

    /// The registry was built without a sequence for every tutorial.
    #[error("step registry is missing sequences for: {missing}")]
    IncompleteRegistry {
        /// Comma-separated names of the missing tutorials.
        missing: String,
    },

    /// A command was sent after the router task stopped.
    #[error("the tutorial router has stopped")]
    RouterStopped,
}

/// Errors that can occur while reading or writing completion flags.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// The progress file could not be read or written.
    #[error("I/O error at '{path}': {message}")]
    Io {
        /// The path where the error occurred.
        path: Utf8PathBuf,
        /// A description of the I/O error.
        message: String,
    },

    /// The progress file exists but is not valid TOML.
    #[error("failed to parse progress file '{path}': {message}")]
    Parse {
        /// The path of the malformed file.
        path: Utf8PathBuf,
        /// A description of the parse error.
        message: String,
    },

    /// The tutorial has no persisted flag.
    #[error("{tutorial} tutorial has no completion flag")]
    NoFlag {
        /// The tutorial that was looked up.
        tutorial: TutorialType,
    },
}

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum TutorialError {
    /// An error occurred during configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A sequencing request was rejected.
    #[error(transparent)]
    Sequencer(#[from] SequencerError),

    /// Completion flags could not be persisted or loaded.
    #[error(transparent)]
    Progress(#[from] ProgressError),

    /// The async runtime could not be created.
    #[error("failed to create async runtime: {message}")]
    Runtime {
        /// A description of the failure.
        message: String,
    },
}

/// A specialised `Result` type for tutorial sequencer operations.
pub type Result<T> = std::result::Result<T, TutorialError>;
