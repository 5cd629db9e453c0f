//! Headless UI adapters that log instead of drawing.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::SequencerError;
use crate::overlay::MaskSurface;
use crate::steps::{StepHandle, StepRegistry, TutorialStep};
use crate::tutorial::TutorialType;

/// Step that reports highlight changes to the log.
#[derive(Debug)]
pub(super) struct ConsoleStep {
    tutorial: TutorialType,
    index: usize,
    text: &'static str,
}

impl TutorialStep for ConsoleStep {
    fn activate(&self) {
        info!(tutorial = %self.tutorial, step = self.index, "step highlighted");
    }

    fn deactivate(&self) {
        debug!(tutorial = %self.tutorial, step = self.index, "step cleared");
    }

    fn message(&self) -> Option<String> {
        Some(String::from(self.text))
    }
}

/// Overlay that reports mask changes to the log.
#[derive(Debug, Default)]
pub(super) struct ConsoleSurface;

impl MaskSurface for ConsoleSurface {
    fn set_mask_visible(&self, visible: bool) {
        debug!(visible, "mask");
    }

    fn set_raycast_blocking(&self, partial: bool) {
        debug!(partial, "raycast blocking");
    }

    fn set_tap_handler(&self, armed: bool) {
        debug!(armed, "tap handler");
    }

    fn show_message(&self, text: &str) {
        info!(text, "message board");
    }

    fn hide_message(&self) {
        debug!("message board hidden");
    }
}

const fn script(tutorial: TutorialType) -> &'static [&'static str] {
    match tutorial {
        TutorialType::None => &[],
        TutorialType::Gathering => &[
            "Tap glowing elements to collect them.",
            "Collected elements go to your inventory.",
            "Leave the gathering area when you are ready.",
        ],
        TutorialType::Crafting => &[
            "Drag one element onto another.",
            "Matching pairs create something new.",
            "New discoveries are added to your book.",
        ],
        TutorialType::BuyHint => &[
            "Stuck? Hints reveal an undiscovered element.",
            "Tap the hint button to buy one.",
        ],
        TutorialType::UpgradePowerup => &[
            "Powerups make gathering faster.",
            "Tap a powerup to upgrade it.",
        ],
        TutorialType::TierSwitch => &[
            "Each tier holds a new set of elements.",
            "Use the tier selector to move between them.",
            "Your discoveries are kept in every tier.",
        ],
    }
}

/// Builds a registry of logging steps for every tutorial.
pub(super) fn console_registry() -> Result<StepRegistry, SequencerError> {
    TutorialType::ACTIVE
        .into_iter()
        .fold(StepRegistry::builder(), |builder, tutorial| {
            builder.sequence(
                tutorial,
                script(tutorial).iter().enumerate().map(|(index, &text)| {
                    Arc::new(ConsoleStep {
                        tutorial,
                        index,
                        text,
                    }) as StepHandle
                }),
            )
        })
        .build()
}
