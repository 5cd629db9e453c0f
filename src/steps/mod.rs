//! Tutorial steps and the per-tutorial step registry.
//!
//! A step is one point in a tutorial: the UI affordances highlighted while
//! the player is expected to act on them. The UI layer implements
//! [`TutorialStep`] and owns the step objects; the [`StepRegistry`] only holds
//! shared handles and a cursor per tutorial.

mod registry;


use std::sync::Arc;

pub use registry::{StepRegistry, StepRegistryBuilder};

/// UI affordances associated with one point in a tutorial sequence.
#[cfg_attr(test, mockall::automock)]
pub trait TutorialStep: Send + Sync {
    /// Highlights the affordances and makes them interactive above the mask.
    fn activate(&self);

    /// Removes the highlight.
    fn deactivate(&self);

    /// Text shown on the message board while this step is current.
    fn message(&self) -> Option<String> {
        None
    }
}

/// Shared handle to a step owned by the UI layer.
pub type StepHandle = Arc<dyn TutorialStep>;
