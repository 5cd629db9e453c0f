//! Tutorial identities.
//!
//! [`TutorialType`] is the closed set of tutorials the sequencer knows about.
//! Each active variant owns one step sequence, one pair of begin/completion
//! signals and one persisted completion flag.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Identifies which step sequence and which signal pair apply.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum TutorialType {
    /// No tutorial. Never active.
    #[default]
    #[value(skip)]
    None,
    /// Leaving the gathering screen.
    Gathering,
    /// Combining two elements into a new one.
    Crafting,
    /// Buying a hint for an undiscovered element.
    BuyHint,
    /// Upgrading a powerup.
    UpgradePowerup,
    /// Switching to another element tier.
    TierSwitch,
}

impl TutorialType {
    /// Every tutorial that can run, in registry order.
    pub const ACTIVE: [Self; 5] = [
        Self::Gathering,
        Self::Crafting,
        Self::BuyHint,
        Self::UpgradePowerup,
        Self::TierSwitch,
    ];

    /// Returns whether this variant names a runnable tutorial.
    #[must_use]
    pub const fn is_active_type(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns the persisted flag key recording this tutorial's completion.
    ///
    /// `None` has no flag.
    #[must_use]
    pub const fn completion_key(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Gathering => Some("gathering_completed"),
            Self::Crafting => Some("crafting_completed"),
            Self::BuyHint => Some("buy_hint_completed"),
            Self::UpgradePowerup => Some("upgrade_powerup_completed"),
            Self::TierSwitch => Some("tier_switch_completed"),
        }
    }

    /// Stable snake-case name used in logs and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gathering => "gathering",
            Self::Crafting => "crafting",
            Self::BuyHint => "buy_hint",
            Self::UpgradePowerup => "upgrade_powerup",
            Self::TierSwitch => "tier_switch",
        }
    }
}

impl fmt::Display for TutorialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
