//! Full-screen mask and message board control.
//!
//! The mask widget itself belongs to the UI framework and is reached through
//! [`MaskSurface`]. [`MaskController`] remembers what it last told the
//! surface and only forwards actual changes, so repeated toggles never wire
//! the tap-to-dismiss handler twice.


use std::fmt;
use std::sync::Arc;

use tracing::debug;

/// UI-side overlay that intercepts pointer input while a tutorial runs.
#[cfg_attr(test, mockall::automock)]
pub trait MaskSurface: Send + Sync {
    /// Shows or hides the full-screen click-blocking overlay.
    fn set_mask_visible(&self, visible: bool);

    /// Switches the overlay to raycast-only blocking so that selected screens
    /// stay interactive underneath it.
    fn set_raycast_blocking(&self, partial: bool);

    /// Wires or unwires the single tap-to-dismiss handler on the overlay.
    fn set_tap_handler(&self, armed: bool);

    /// Shows text on the message board.
    fn show_message(&self, text: &str);

    /// Hides the message board.
    fn hide_message(&self);
}

/// Current overlay state as last applied to the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaskState {
    /// The full-screen mask is shown.
    pub mask_visible: bool,
    /// Raycast-only blocking is enabled.
    pub partial_block: bool,
    /// The tap-to-dismiss handler is wired.
    pub tap_armed: bool,
    /// The message board is shown.
    pub message_visible: bool,
}

/// Tracks and applies the overlay state for the sequencer.
pub struct MaskController {
    surface: Arc<dyn MaskSurface>,
    state: MaskState,
}

impl fmt::Debug for MaskController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskController")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl MaskController {
    /// Creates a controller over `surface`, assuming everything starts hidden.
    #[must_use]
    pub fn new(surface: Arc<dyn MaskSurface>) -> Self {
        Self {
            surface,
            state: MaskState::default(),
        }
    }

    /// Returns the state last applied to the surface.
    #[must_use]
    pub const fn state(&self) -> MaskState {
        self.state
    }

    /// Shows or hides the full-screen mask.
    pub fn toggle_mask(&mut self, active: bool) {
        if self.state.mask_visible != active {
            debug!(active, "toggling tutorial mask");
            self.surface.set_mask_visible(active);
            self.state.mask_visible = active;
        }
    }

    /// Enables or disables raycast-only blocking.
    pub fn toggle_blocking_raycasts_inactive(&mut self, active: bool) {
        if self.state.partial_block != active {
            debug!(active, "toggling partial raycast blocking");
            self.surface.set_raycast_blocking(active);
            self.state.partial_block = active;
        }
    }

    /// Wires or unwires the tap-to-dismiss handler.
    pub fn toggle_end_tutorial_on_tap(&mut self, active: bool) {
        if self.state.tap_armed != active {
            debug!(active, "toggling tap to dismiss");
            self.surface.set_tap_handler(active);
            self.state.tap_armed = active;
        }
    }

    /// Shows `text` on the message board, or hides the board for `None`.
    pub fn show_message(&mut self, text: Option<&str>) {
        match text {
            Some(text) => {
                self.surface.show_message(text);
                self.state.message_visible = true;
            }
            None => self.hide_message(),
        }
    }

    /// Hides the message board if it is shown.
    pub fn hide_message(&mut self) {
        if self.state.message_visible {
            self.surface.hide_message();
            self.state.message_visible = false;
        }
    }

    /// Returns every overlay element to its hidden state.
    pub fn clear(&mut self) {
        self.toggle_end_tutorial_on_tap(false);
        self.toggle_blocking_raycasts_inactive(false);
        self.hide_message();
        self.toggle_mask(false);
    }
}
