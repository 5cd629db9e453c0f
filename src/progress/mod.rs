//! Persisted tutorial completion flags.
//!
//! Each runnable tutorial owns one boolean flag (see
//! [`TutorialType::completion_key`]) that is set the first time the tutorial
//! completes. [`ProgressStore`] is the persistence boundary; the crate ships
//! an in-memory store and a TOML file store.

mod file;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

pub use file::{TomlProgressStore, default_progress_path};

use crate::error::ProgressError;
use crate::tutorial::TutorialType;

/// Key-value flag store for tutorial completion.
pub trait ProgressStore: Send + Sync {
    /// Returns whether `tutorial` has been completed before.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` when the flags cannot be read.
    fn is_completed(&self, tutorial: TutorialType) -> Result<bool, ProgressError>;

    /// Records that `tutorial` has been completed.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` when the flag cannot be written.
    fn mark_completed(&self, tutorial: TutorialType) -> Result<(), ProgressError>;

    /// Clears every completion flag.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` when the flags cannot be written.
    fn reset(&self) -> Result<(), ProgressError>;

    /// Returns the flag of every runnable tutorial.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` when the flags cannot be read.
    fn snapshot(&self) -> Result<BTreeMap<TutorialType, bool>, ProgressError> {
        TutorialType::ACTIVE
            .into_iter()
            .map(|tutorial| Ok((tutorial, self.is_completed(tutorial)?)))
            .collect()
    }
}

/// Flag store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    completed: Mutex<BTreeSet<TutorialType>>,
}

impl MemoryProgressStore {
    /// Creates a store with every flag cleared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn key_of(tutorial: TutorialType) -> Result<&'static str, ProgressError> {
    tutorial
        .completion_key()
        .ok_or(ProgressError::NoFlag { tutorial })
}

impl ProgressStore for MemoryProgressStore {
    fn is_completed(&self, tutorial: TutorialType) -> Result<bool, ProgressError> {
        key_of(tutorial)?;
        Ok(self
            .completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&tutorial))
    }

    fn mark_completed(&self, tutorial: TutorialType) -> Result<(), ProgressError> {
        key_of(tutorial)?;
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tutorial);
        Ok(())
    }

    fn reset(&self) -> Result<(), ProgressError> {
        self.completed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}
