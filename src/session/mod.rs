//! Tutorial session controller.
//!
//! [`Sequencer`] owns the active-tutorial state machine. It starts a session
//! when asked for a tutorial whose begin signal has listeners, moves the step
//! cursor forwards and backwards, and ends the session either on a matching
//! "work done" event or on a tap on the mask. Each session runs a completion
//! timer whose final report is delivered through the channel handed to
//! [`Sequencer::new`].
//!
//! At most one session is active at a time. Starting another one while a
//! session runs is a caller error and is rejected.

mod timer;


use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::SequencerError;
use crate::overlay::{MaskController, MaskState, MaskSurface};
use crate::signals::{Signal, SignalBus, Topic, WorkDone};
use crate::steps::StepRegistry;
use crate::tutorial::TutorialType;
use timer::SessionTimer;

/// Default completion timer cadence, one fixed simulation step.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(20);

/// Behaviour switches for the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Completion timer cadence.
    pub tick_interval: Duration,
    /// Put the step cursor back on the first step whenever a session starts.
    pub reset_cursor_on_start: bool,
    /// Tutorials that keep selected screens interactive under the mask.
    pub partial_block: BTreeSet<TutorialType>,
    /// Tutorials the player may dismiss by tapping the mask.
    pub tap_to_dismiss: BTreeSet<TutorialType>,
    /// Tutorials that highlight every step when they begin.
    pub reveal_all_on_begin: BTreeSet<TutorialType>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            reset_cursor_on_start: true,
            partial_block: BTreeSet::from([TutorialType::TierSwitch]),
            tap_to_dismiss: BTreeSet::from([TutorialType::BuyHint, TutorialType::UpgradePowerup]),
            reveal_all_on_begin: BTreeSet::new(),
        }
    }
}

impl From<&AppConfig> for SessionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.timer.tick_interval_ms.max(1)),
            reset_cursor_on_start: config.session.reset_cursor_on_start,
            partial_block: config.overlay.partial_block.iter().copied().collect(),
            tap_to_dismiss: config.overlay.tap_to_dismiss.iter().copied().collect(),
            reveal_all_on_begin: config.overlay.reveal_all_on_begin.iter().copied().collect(),
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndReason {
    /// The subsystem the tutorial teaches reported finished work.
    Work(WorkDone),
    /// The player tapped the mask.
    Tap,
    /// The session was ended directly.
    Requested,
}

/// Final figure sent by a session's completion timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerReport {
    /// The tutorial that ran.
    pub tutorial: TutorialType,
    /// Time between start and end.
    pub elapsed: Duration,
    /// Why the session ended.
    pub reason: EndReason,
}

/// Result of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A session is now running.
    Started,
    /// Nobody listens for the tutorial's begin signal, so nothing happened.
    Ignored,
}

#[derive(Debug)]
struct TutorialSession {
    tutorial: TutorialType,
    active: bool,
    timer: SessionTimer,
}

/// Collaborators needed to build a [`Sequencer`].
///
/// Groups the arguments into a single struct to keep the constructor to one
/// parameter.
pub struct SequencerParams {
    /// Steps for every tutorial.
    pub registry: StepRegistry,
    /// Overlay the mask controller drives.
    pub surface: Arc<dyn MaskSurface>,
    /// Bus the begin signal is published on.
    pub bus: SignalBus,
    /// Behaviour switches.
    pub settings: SessionSettings,
    /// Runtime the completion timer runs on.
    pub runtime: Handle,
    /// Receives one report per finished session.
    pub reports: mpsc::UnboundedSender<TimerReport>,
}

/// The tutorial state machine.
pub struct Sequencer {
    registry: StepRegistry,
    mask: MaskController,
    bus: SignalBus,
    settings: SessionSettings,
    runtime: Handle,
    reports: mpsc::UnboundedSender<TimerReport>,
    session: Option<TutorialSession>,
}

impl fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer")
            .field("registry", &self.registry)
            .field("mask", &self.mask)
            .field("settings", &self.settings)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Sequencer {
    /// Creates an idle sequencer.
    #[must_use]
    pub fn new(params: SequencerParams) -> Self {
        let SequencerParams {
            registry,
            surface,
            bus,
            settings,
            runtime,
            reports,
        } = params;
        Self {
            registry,
            mask: MaskController::new(surface),
            bus,
            settings,
            runtime,
            reports,
            session: None,
        }
    }

    /// Returns whether a session is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active_tutorial().is_some()
    }

    /// The tutorial of the running session, if any.
    #[must_use]
    pub fn active_tutorial(&self) -> Option<TutorialType> {
        self.session
            .as_ref()
            .filter(|s| s.active)
            .map(|s| s.tutorial)
    }

    /// The tutorial of the latest session, running or not.
    #[must_use]
    pub fn current_tutorial(&self) -> TutorialType {
        self.session
            .as_ref()
            .map_or(TutorialType::None, |s| s.tutorial)
    }

    /// Cursor position within the latest session's tutorial.
    #[must_use]
    pub fn current_step_index(&self) -> Option<usize> {
        self.registry.cursor(self.current_tutorial())
    }

    /// Time accumulated by the latest session's timer.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.session
            .as_ref()
            .map_or(Duration::ZERO, |s| s.timer.elapsed())
    }

    /// Returns whether the latest session's timer task is still running.
    #[must_use]
    pub fn timer_running(&self) -> bool {
        self.session.as_ref().is_some_and(|s| !s.timer.is_finished())
    }

    /// Overlay state as last applied.
    #[must_use]
    pub const fn mask_state(&self) -> MaskState {
        self.mask.state()
    }

    /// Read access to the step registry.
    #[must_use]
    pub const fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Starts a session for `tutorial`.
    ///
    /// Does nothing and returns [`StartOutcome::Ignored`] when no handler
    /// listens for the tutorial's begin signal. Otherwise highlights the
    /// first step, publishes `TutorialBegan` exactly once, raises the mask
    /// and starts the completion timer.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::SessionAlreadyActive` while another session
    /// runs and `SequencerError::NoSteps` for [`TutorialType::None`].
    pub fn start_tutorial(
        &mut self,
        tutorial: TutorialType,
    ) -> Result<StartOutcome, SequencerError> {
        if let Some(active) = self.active_tutorial() {
            return Err(SequencerError::SessionAlreadyActive {
                active,
                requested: tutorial,
            });
        }
        if !tutorial.is_active_type() {
            return Err(SequencerError::NoSteps { tutorial });
        }
        if !self.bus.has_subscribers(Topic::Began(tutorial)) {
            debug!(%tutorial, "no begin handler registered; ignoring start");
            return Ok(StartOutcome::Ignored);
        }

        if self.settings.reset_cursor_on_start {
            self.registry.reset(tutorial);
        }
        if self.settings.reveal_all_on_begin.contains(&tutorial) {
            self.registry.activate_all(tutorial);
        }
        let step = self
            .registry
            .current(tutorial)
            .ok_or(SequencerError::NoSteps { tutorial })?;
        step.activate();
        self.mask.show_message(step.message().as_deref());

        self.bus.publish(&Signal::TutorialBegan(tutorial));

        self.mask.toggle_mask(true);
        if self.settings.partial_block.contains(&tutorial) {
            self.mask.toggle_blocking_raycasts_inactive(true);
        }
        if self.settings.tap_to_dismiss.contains(&tutorial) {
            self.mask.toggle_end_tutorial_on_tap(true);
        }

        let timer = SessionTimer::spawn(
            &self.runtime,
            tutorial,
            self.settings.tick_interval,
            self.reports.clone(),
        );
        self.session = Some(TutorialSession {
            tutorial,
            active: true,
            timer,
        });
        info!(%tutorial, step = ?self.registry.cursor(tutorial), "tutorial started");
        Ok(StartOutcome::Started)
    }

    /// Moves to the next step and returns its index.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::NoActiveSession` when idle and
    /// `SequencerError::StepOutOfRange` on the last step. Nothing changes
    /// in either case.
    pub fn advance_step(&mut self) -> Result<usize, SequencerError> {
        self.move_cursor(1)
    }

    /// Moves to the previous step and returns its index.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::NoActiveSession` when idle and
    /// `SequencerError::StepOutOfRange` on the first step. Nothing changes
    /// in either case.
    pub fn step_back(&mut self) -> Result<usize, SequencerError> {
        self.move_cursor(-1)
    }

    fn move_cursor(&mut self, delta: isize) -> Result<usize, SequencerError> {
        let tutorial = self
            .active_tutorial()
            .ok_or(SequencerError::NoActiveSession)?;
        self.registry.target_index(tutorial, delta)?;

        if let Some(outgoing) = self.registry.current(tutorial) {
            outgoing.deactivate();
        }
        let index = self.registry.modify_index(tutorial, delta)?;
        let incoming = self
            .registry
            .current(tutorial)
            .ok_or(SequencerError::NoSteps { tutorial })?;
        incoming.activate();
        self.mask.show_message(incoming.message().as_deref());

        debug!(%tutorial, index, "tutorial step changed");
        Ok(index)
    }

    /// Ends the running session. Does nothing when idle.
    pub fn end_tutorial(&mut self) {
        self.end_with(EndReason::Requested);
    }

    fn end_with(&mut self, reason: EndReason) {
        self.mask.clear();
        let Some(session) = self.session.as_mut().filter(|s| s.active) else {
            return;
        };
        session.active = false;
        info!(tutorial = %session.tutorial, ?reason, "tutorial ended");
        session.timer.stop(reason);
    }

    /// Ends the running session because the player tapped the mask.
    ///
    /// Buy-hint and upgrade-powerup tutorials go through their work-done end
    /// handlers with the dismissal sentinel payload; every other tutorial is
    /// simply closed and its steps deactivated.
    pub fn end_tutorial_on_tap(&mut self) {
        let Some(tutorial) = self.active_tutorial() else {
            debug!("tap received with no active tutorial");
            return;
        };
        let handled = match tutorial {
            TutorialType::BuyHint => self.finish_on_work_done(&WorkDone::hint_dismissed()),
            TutorialType::UpgradePowerup => {
                self.finish_on_work_done(&WorkDone::powerup_dismissed())
            }
            _ => false,
        };
        if !handled {
            self.end_with(EndReason::Tap);
            self.registry.deactivate_all(tutorial);
        }
    }

    /// Ends the running session if `work` completes it.
    ///
    /// Returns `false` and changes nothing when `work` belongs to another
    /// tutorial or no session is running.
    pub fn finish_on_work_done(&mut self, work: &WorkDone) -> bool {
        let tutorial = work.tutorial();
        if self.active_tutorial() != Some(tutorial) {
            debug!(%tutorial, kind = ?work.kind(), "work done does not match active tutorial");
            return false;
        }
        self.end_with(EndReason::Work(work.clone()));
        self.registry.deactivate_all(tutorial);
        true
    }
}
