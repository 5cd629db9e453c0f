//! Configuration data types for the tutorial sequencer.

use ortho_config::{OrthoConfig, OrthoResult, PostMergeContext, PostMergeHook};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::error::ConfigError;
use crate::tutorial::TutorialType;

/// Completion timer configuration.
#[derive(Debug, Clone, PartialEq, Eq, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Interval between timer ticks in milliseconds. Must be non-zero.
    #[default = 20]
    pub tick_interval_ms: u64,
}

/// Session behaviour configuration.
#[derive(Debug, Clone, PartialEq, Eq, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Rewind a tutorial's step cursor to the first step on every start.
    #[default = true]
    pub reset_cursor_on_start: bool,
}

/// Per-tutorial overlay behaviour.
#[derive(Debug, Clone, PartialEq, Eq, SmartDefault, Deserialize, Serialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Tutorials whose mask switches to raycast-only blocking, leaving
    /// selected screens interactive underneath it.
    #[default(_code = "vec![TutorialType::TierSwitch]")]
    pub partial_block: Vec<TutorialType>,

    /// Tutorials dismissed by tapping the mask.
    #[default(_code = "vec![TutorialType::BuyHint, TutorialType::UpgradePowerup]")]
    pub tap_to_dismiss: Vec<TutorialType>,

    /// Tutorials that show every step at once when they begin.
    pub reveal_all_on_begin: Vec<TutorialType>,
}

impl OverlayConfig {
    fn normalise(&mut self) {
        for list in [
            &mut self.partial_block,
            &mut self.tap_to_dismiss,
            &mut self.reveal_all_on_begin,
        ] {
            list.retain(|tutorial| tutorial.is_active_type());
            list.sort_unstable();
            list.dedup();
        }
    }
}

/// Root application configuration.
///
/// Loaded from defaults, a configuration file, `TUTORSEQ_*` environment
/// variables and command-line arguments, in increasing precedence.
///
/// Configuration files are discovered in this order:
/// 1. Path specified via `TUTORSEQ_CONFIG_PATH`
/// 2. `.tutorseq.toml` in the current working directory
/// 3. `.tutorseq.toml` in the home directory
/// 4. `~/.config/tutorseq/config.toml` (XDG default)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(
    prefix = "TUTORSEQ",
    post_merge_hook,
    discovery(
        app_name = "tutorseq",
        env_var = "TUTORSEQ_CONFIG_PATH",
        config_file_name = "config.toml",
        dotfile_name = ".tutorseq.toml",
        config_cli_long = "config",
        config_cli_visible = true,
    )
)]
pub struct AppConfig {
    /// File holding the completion flags. Defaults to the user data directory.
    pub progress_path: Option<String>,

    /// Completion timer configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub timer: TimerConfig,

    /// Session behaviour configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub session: SessionConfig,

    /// Overlay behaviour configuration.
    #[serde(default)]
    #[ortho_config(skip_cli)]
    pub overlay: OverlayConfig,
}

impl AppConfig {
    /// Checks values that deserialise but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when `timer.tick_interval_ms` is
    /// zero or `progress_path` is empty.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.timer.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: String::from("timer.tick_interval_ms"),
                reason: String::from("must be greater than zero"),
            }
            .into());
        }
        if self.progress_path.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::InvalidValue {
                field: String::from("progress_path"),
                reason: String::from("must not be empty"),
            }
            .into());
        }
        Ok(())
    }
}

impl PostMergeHook for AppConfig {
    fn post_merge(&mut self, _ctx: &PostMergeContext) -> OrthoResult<()> {
        self.overlay.normalise();
        Ok(())
    }
}
