//! Recording fakes for the UI boundary, shared by unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::overlay::MaskSurface;
use crate::steps::{StepHandle, StepRegistry, TutorialStep};
use crate::tutorial::TutorialType;

/// Ordered log of boundary calls, shared between fakes.
#[derive(Clone, Default)]
pub(crate) struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub(crate) fn record(&self, entry: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Step that records activation changes into a journal.
pub(crate) struct RecordingStep {
    name: String,
    active: AtomicBool,
    journal: Journal,
}

impl RecordingStep {
    pub(crate) fn new(name: &str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            name: String::from(name),
            active: AtomicBool::new(false),
            journal: journal.clone(),
        })
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl TutorialStep for RecordingStep {
    fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
        self.journal.record(format!("activate {}", self.name));
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.journal.record(format!("deactivate {}", self.name));
    }

    fn message(&self) -> Option<String> {
        Some(format!("{} hint", self.name))
    }
}

/// Mask surface that records every call into a journal.
#[derive(Default)]
pub(crate) struct RecordingSurface {
    journal: Journal,
}

impl RecordingSurface {
    pub(crate) fn new(journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            journal: journal.clone(),
        })
    }
}

impl MaskSurface for RecordingSurface {
    fn set_mask_visible(&self, visible: bool) {
        self.journal.record(format!("mask {visible}"));
    }

    fn set_raycast_blocking(&self, partial: bool) {
        self.journal.record(format!("partial block {partial}"));
    }

    fn set_tap_handler(&self, armed: bool) {
        self.journal.record(format!("tap handler {armed}"));
    }

    fn show_message(&self, text: &str) {
        self.journal.record(format!("message {text}"));
    }

    fn hide_message(&self) {
        self.journal.record(String::from("message hidden"));
    }
}

/// Registry with three steps per tutorial, named `<tutorial>-<index>`.
///
/// Returns the registry and the steps in registry order.
pub(crate) fn three_step_registry(
    journal: &Journal,
) -> (StepRegistry, Vec<(TutorialType, Vec<Arc<RecordingStep>>)>) {
    let mut builder = StepRegistry::builder();
    let mut all = Vec::new();
    for tutorial in TutorialType::ACTIVE {
        let steps: Vec<Arc<RecordingStep>> = (0..3)
            .map(|i| RecordingStep::new(&format!("{tutorial}-{i}"), journal))
            .collect();
        builder = builder.sequence(
            tutorial,
            steps.iter().map(|s| Arc::clone(s) as StepHandle),
        );
        all.push((tutorial, steps));
    }
    match builder.build() {
        Ok(registry) => (registry, all),
        Err(e) => panic!("complete registry should build: {e}"),
    }
}
