//! Signals exchanged with the rest of the game.
//!
//! Inbound signals ask for a tutorial to begin or report that some unrelated
//! subsystem finished the work a tutorial was teaching. Outbound signals tell
//! the UI a tutorial began and tell listeners it completed, together with the
//! measured completion time.
//!
//! Every signal maps to a [`Topic`]; the [`SignalBus`] routes by topic.

mod bus;


use std::time::Duration;

pub use bus::{SignalBus, Subscription};

use crate::tutorial::TutorialType;

/// Payload value used when a tutorial is dismissed instead of completed.
pub const DISMISSED: &str = "none";

/// Identifies the subsystem event that finishes a tutorial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkKind {
    /// The player left the gathering screen.
    GatheringExited,
    /// The player crafted an element.
    ElementCrafted,
    /// An element tier finished loading.
    TierLoaded,
    /// A powerup was upgraded.
    PowerupUpgraded,
    /// A hint was bought.
    HintPurchased,
}

impl WorkKind {
    /// Every work kind the router listens for.
    pub const ALL: [Self; 5] = [
        Self::GatheringExited,
        Self::ElementCrafted,
        Self::TierLoaded,
        Self::PowerupUpgraded,
        Self::HintPurchased,
    ];

    /// The tutorial this kind of work completes.
    #[must_use]
    pub const fn tutorial(self) -> TutorialType {
        match self {
            Self::GatheringExited => TutorialType::Gathering,
            Self::ElementCrafted => TutorialType::Crafting,
            Self::TierLoaded => TutorialType::TierSwitch,
            Self::PowerupUpgraded => TutorialType::UpgradePowerup,
            Self::HintPurchased => TutorialType::BuyHint,
        }
    }
}

/// A "work done" event raised by a subsystem outside the tutorial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkDone {
    /// The player left the gathering screen.
    GatheringExited,
    /// A new element was crafted from two parents.
    ElementCrafted {
        /// Name of the crafted element.
        element: String,
        /// First parent element.
        parent_a: String,
        /// Second parent element.
        parent_b: String,
        /// Whether the element had not been discovered before.
        new_discovery: bool,
    },
    /// An element tier finished loading.
    TierLoaded {
        /// Index of the loaded tier.
        tier: u32,
    },
    /// A powerup was upgraded.
    PowerupUpgraded {
        /// Name of the upgraded powerup.
        powerup: String,
        /// Level reached.
        level: u32,
    },
    /// A hint was bought.
    HintPurchased {
        /// Element the hint reveals.
        element: String,
    },
}

impl WorkDone {
    /// Hint purchase carrying the dismissal sentinel.
    #[must_use]
    pub fn hint_dismissed() -> Self {
        Self::HintPurchased {
            element: String::from(DISMISSED),
        }
    }

    /// Powerup upgrade carrying the dismissal sentinel.
    #[must_use]
    pub fn powerup_dismissed() -> Self {
        Self::PowerupUpgraded {
            powerup: String::from(DISMISSED),
            level: 0,
        }
    }

    /// Returns whether this event carries the dismissal sentinel.
    #[must_use]
    pub fn is_dismissal(&self) -> bool {
        match self {
            Self::HintPurchased { element } => element == DISMISSED,
            Self::PowerupUpgraded { powerup, level } => powerup == DISMISSED && *level == 0,
            _ => false,
        }
    }

    /// Returns the kind of work this event reports.
    #[must_use]
    pub const fn kind(&self) -> WorkKind {
        match self {
            Self::GatheringExited => WorkKind::GatheringExited,
            Self::ElementCrafted { .. } => WorkKind::ElementCrafted,
            Self::TierLoaded { .. } => WorkKind::TierLoaded,
            Self::PowerupUpgraded { .. } => WorkKind::PowerupUpgraded,
            Self::HintPurchased { .. } => WorkKind::HintPurchased,
        }
    }

    /// The tutorial this event completes.
    #[must_use]
    pub const fn tutorial(&self) -> TutorialType {
        self.kind().tutorial()
    }
}

/// Routing key for the [`SignalBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// A subsystem asks for a tutorial to begin.
    Requested(TutorialType),
    /// A tutorial session has begun.
    Began(TutorialType),
    /// A tutorial session has completed.
    Completed(TutorialType),
    /// A subsystem finished some work.
    WorkDone(WorkKind),
}

impl Topic {
    /// Returns the completion topic paired with a begin topic.
    ///
    /// Only the five `Requested` topics for runnable tutorials have a pair.
    #[must_use]
    pub const fn completion_for(self) -> Option<Self> {
        match self {
            Self::Requested(tutorial) if tutorial.is_active_type() => {
                Some(Self::Completed(tutorial))
            }
            _ => None,
        }
    }
}

/// A message published on the [`SignalBus`].
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Ask for a tutorial to begin.
    TutorialRequested(TutorialType),
    /// A tutorial session began; UI listeners highlight their first affordances.
    TutorialBegan(TutorialType),
    /// A tutorial session completed.
    TutorialCompleted {
        /// The completed tutorial.
        tutorial: TutorialType,
        /// Time measured between start and end.
        elapsed: Duration,
    },
    /// A subsystem finished some work.
    WorkDone(WorkDone),
}

impl Signal {
    /// Returns the topic this signal is delivered on.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::TutorialRequested(tutorial) => Topic::Requested(*tutorial),
            Self::TutorialBegan(tutorial) => Topic::Began(*tutorial),
            Self::TutorialCompleted { tutorial, .. } => Topic::Completed(*tutorial),
            Self::WorkDone(work) => Topic::WorkDone(work.kind()),
        }
    }
}
