//! Behavioural step helpers for tutorial session scenarios.

mod assertions;
mod state;
mod steps;

pub use state::{TutorialSessionState, tutorial_session_state};
