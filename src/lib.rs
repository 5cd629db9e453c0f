//! Step-based tutorial sequencing for games.
//!
//! A tutorial is a short ordered list of highlighted steps shown over the
//! game UI behind a click-blocking mask. `tutorial_sequencer` runs one such
//! session at a time: it starts a tutorial when the game asks for it, moves
//! between steps on player input, ends the session when the subsystem being
//! taught reports finished work (or the player taps the mask), times how long
//! the player spent, and persists a completion flag.
//!
//! # Architecture
//!
//! Game code and the sequencer talk over a [`signals::SignalBus`]. The
//! [`router::TutorialRouter`] task owns the [`session::Sequencer`] state
//! machine; bus callbacks and [`router::RouterHandle`]s only enqueue
//! commands, so session state is mutated from a single task. Each session's
//! completion timer is a separate cooperative task that reports back over a
//! channel.
//!
//! # Modules
//!
//! - [`tutorial`]: The closed set of tutorial identities
//! - [`steps`]: Step boundary trait and the per-tutorial step registry
//! - [`overlay`]: Mask and message board control
//! - [`session`]: Session state machine and completion timer
//! - [`signals`]: Signal types and the topic-keyed bus
//! - [`router`]: Actor wiring the bus to the session controller
//! - [`progress`]: Persisted completion flags
//! - [`analytics`]: Completion analytics sink
//! - [`config`]: Configuration system with layered precedence (CLI > env > file > defaults)
//! - [`api`]: Command orchestration used by the `tutorseq` binary
//! - [`error`]: Semantic error types for the crate

pub mod analytics;
pub mod api;
pub mod config;
pub mod error;
pub mod overlay;
pub mod progress;
pub mod router;
pub mod session;
pub mod signals;
pub mod steps;
pub mod tutorial;

#[cfg(test)]
mod test_support;
