//! Configuration system for tutorseq.
//!
//! Configuration is merged by `ortho_config` with the precedence: CLI flags
//! over environment variables over configuration files over defaults. The
//! configuration file is expected at `~/.config/tutorseq/config.toml` by
//! default.
//!
//! # Example Configuration
//!
//! ```toml
//! progress_path = "/home/user/.local/share/tutorseq/progress.toml"
//!
//! [timer]
//! tick_interval_ms = 20
//!
//! [session]
//! reset_cursor_on_start = true
//!
//! [overlay]
//! partial_block = ["tier_switch"]
//! tap_to_dismiss = ["buy_hint", "upgrade_powerup"]
//! reveal_all_on_begin = []
//! ```

mod cli;
mod loader;
mod types;


pub use cli::{Cli, Commands, SimulateArgs};
pub use loader::{env_var_names, load_config, load_config_with_env};
pub use types::{AppConfig, OverlayConfig, SessionConfig, TimerConfig};
