//! Ordered step sequences with one cursor per tutorial.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::StepHandle;
use crate::error::SequencerError;
use crate::tutorial::TutorialType;

struct StepSequence {
    steps: Vec<StepHandle>,
    cursor: usize,
}

impl StepSequence {
    fn get(&self, index: usize) -> Option<StepHandle> {
        self.steps.get(index).map(Arc::clone)
    }
}

/// Step sequences for every runnable tutorial.
///
/// Only [`StepRegistryBuilder::build`] creates a registry, and it refuses to
/// do so unless every [`TutorialType::ACTIVE`] variant has at least one step.
/// Lookups for [`TutorialType::None`] therefore always miss.
pub struct StepRegistry {
    sequences: BTreeMap<TutorialType, StepSequence>,
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (tutorial, sequence) in &self.sequences {
            map.entry(
                tutorial,
                &format_args!("{}/{}", sequence.cursor, sequence.steps.len()),
            );
        }
        map.finish()
    }
}

impl StepRegistry {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> StepRegistryBuilder {
        StepRegistryBuilder::default()
    }

    /// Number of steps registered for `tutorial`.
    #[must_use]
    pub fn step_count(&self, tutorial: TutorialType) -> usize {
        self.sequences.get(&tutorial).map_or(0, |s| s.steps.len())
    }

    /// Current cursor position for `tutorial`.
    #[must_use]
    pub fn cursor(&self, tutorial: TutorialType) -> Option<usize> {
        self.sequences.get(&tutorial).map(|s| s.cursor)
    }

    /// Returns the step at `index`, or `None` when out of bounds.
    #[must_use]
    pub fn step(&self, tutorial: TutorialType, index: usize) -> Option<StepHandle> {
        self.sequences.get(&tutorial)?.get(index)
    }

    /// Returns the step under the cursor.
    #[must_use]
    pub fn current(&self, tutorial: TutorialType) -> Option<StepHandle> {
        let sequence = self.sequences.get(&tutorial)?;
        sequence.get(sequence.cursor)
    }

    /// Returns the step after the cursor.
    #[must_use]
    pub fn next(&self, tutorial: TutorialType) -> Option<StepHandle> {
        let sequence = self.sequences.get(&tutorial)?;
        sequence.get(sequence.cursor.checked_add(1)?)
    }

    /// Returns the step before the cursor.
    #[must_use]
    pub fn previous(&self, tutorial: TutorialType) -> Option<StepHandle> {
        let sequence = self.sequences.get(&tutorial)?;
        sequence.get(sequence.cursor.checked_sub(1)?)
    }

    /// Returns the index the cursor would land on after moving by `delta`.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::NoSteps` when the tutorial has no sequence and
    /// `SequencerError::StepOutOfRange` when the move would leave the list.
    pub fn target_index(
        &self,
        tutorial: TutorialType,
        delta: isize,
    ) -> Result<usize, SequencerError> {
        let sequence = self
            .sequences
            .get(&tutorial)
            .ok_or(SequencerError::NoSteps { tutorial })?;
        let len = sequence.steps.len();
        sequence
            .cursor
            .checked_add_signed(delta)
            .filter(|target| *target < len)
            .ok_or_else(|| SequencerError::StepOutOfRange {
                tutorial,
                index: isize::try_from(sequence.cursor)
                    .unwrap_or(isize::MAX)
                    .saturating_add(delta),
                len,
            })
    }

    /// Moves the cursor for `tutorial` by `delta` and returns the new index.
    ///
    /// The cursor never leaves the step list: a move past either end is
    /// rejected and the cursor stays where it was.
    ///
    /// # Errors
    ///
    /// Same as [`Self::target_index`].
    pub fn modify_index(
        &mut self,
        tutorial: TutorialType,
        delta: isize,
    ) -> Result<usize, SequencerError> {
        let target = self.target_index(tutorial, delta)?;
        if let Some(sequence) = self.sequences.get_mut(&tutorial) {
            debug!(%tutorial, from = sequence.cursor, to = target, "moving step cursor");
            sequence.cursor = target;
        }
        Ok(target)
    }

    /// Puts the cursor for `tutorial` back on the first step.
    pub fn reset(&mut self, tutorial: TutorialType) {
        if let Some(sequence) = self.sequences.get_mut(&tutorial) {
            sequence.cursor = 0;
        }
    }

    /// Activates every step of `tutorial`.
    pub fn activate_all(&self, tutorial: TutorialType) {
        for step in self.steps_of(tutorial) {
            step.activate();
        }
    }

    /// Deactivates every step of `tutorial`.
    pub fn deactivate_all(&self, tutorial: TutorialType) {
        for step in self.steps_of(tutorial) {
            step.deactivate();
        }
    }

    fn steps_of(&self, tutorial: TutorialType) -> &[StepHandle] {
        self.sequences
            .get(&tutorial)
            .map(|s| s.steps.as_slice())
            .unwrap_or_default()
    }
}

/// Collects step sequences and validates them into a [`StepRegistry`].
#[derive(Default)]
pub struct StepRegistryBuilder {
    sequences: BTreeMap<TutorialType, Vec<StepHandle>>,
}

impl StepRegistryBuilder {
    /// Appends `steps` to the sequence for `tutorial`.
    #[must_use]
    pub fn sequence<I>(mut self, tutorial: TutorialType, steps: I) -> Self
    where
        I: IntoIterator<Item = StepHandle>,
    {
        self.sequences.entry(tutorial).or_default().extend(steps);
        self
    }

    /// Appends a single step to the sequence for `tutorial`.
    #[must_use]
    pub fn step(self, tutorial: TutorialType, step: StepHandle) -> Self {
        self.sequence(tutorial, [step])
    }

    /// Validates that every runnable tutorial has steps and builds the registry.
    ///
    /// Sequences registered under [`TutorialType::None`] are discarded.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::IncompleteRegistry` naming every runnable
    /// tutorial without at least one step.
    pub fn build(mut self) -> Result<StepRegistry, SequencerError> {
        if self.sequences.remove(&TutorialType::None).is_some() {
            warn!("discarding steps registered for the none tutorial");
        }

        let missing: Vec<&str> = TutorialType::ACTIVE
            .iter()
            .filter(|t| self.sequences.get(*t).is_none_or(Vec::is_empty))
            .map(|t| t.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(SequencerError::IncompleteRegistry {
                missing: missing.join(", "),
            });
        }

        let sequences = self
            .sequences
            .into_iter()
            .map(|(tutorial, steps)| (tutorial, StepSequence { steps, cursor: 0 }))
            .collect();
        Ok(StepRegistry { sequences })
    }
}
