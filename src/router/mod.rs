//! Event router between the signal bus and the session controller.
//!
//! [`TutorialRouter`] is an actor: it owns the [`Sequencer`] and is the only
//! code that mutates it. Bus callbacks and [`RouterHandle`]s turn inputs into
//! [`RouterCommand`]s on an unbounded channel, and [`TutorialRouter::run`]
//! applies them one at a time. Completion timer reports arrive on a second
//! channel and are turned into a persisted flag, an analytics event and a
//! `TutorialCompleted` signal.


use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::analytics::AnalyticsSink;
use crate::error::SequencerError;
use crate::overlay::{MaskState, MaskSurface};
use crate::progress::ProgressStore;
use crate::session::{Sequencer, SequencerParams, SessionSettings, StartOutcome, TimerReport};
use crate::signals::{Signal, SignalBus, Subscription, Topic, WorkDone, WorkKind};
use crate::steps::StepRegistry;
use crate::tutorial::TutorialType;

/// Work item for the router task.
#[derive(Debug)]
pub enum RouterCommand {
    /// Start the given tutorial.
    Begin(TutorialType),
    /// Subsystem work finished; may complete the running tutorial.
    WorkDone(WorkDone),
    /// Move to the next step.
    Advance,
    /// Move to the previous step.
    StepBack,
    /// The player tapped the mask.
    Tap,
    /// Reply with the current [`RouterStatus`].
    Snapshot(oneshot::Sender<RouterStatus>),
    /// Stop the router task.
    Shutdown,
}

/// Point-in-time view of the session the router drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterStatus {
    /// Tutorial of the running session.
    pub active: Option<TutorialType>,
    /// Tutorial of the latest session, running or not.
    pub current: TutorialType,
    /// Step cursor of the latest session's tutorial.
    pub step: Option<usize>,
    /// Time accumulated by the latest session's timer.
    pub elapsed: Duration,
    /// Overlay state.
    pub mask: MaskState,
}

/// Cloneable command surface for UI code.
#[derive(Debug, Clone)]
pub struct RouterHandle {
    commands: mpsc::UnboundedSender<RouterCommand>,
}

impl RouterHandle {
    fn send(&self, command: RouterCommand) -> Result<(), SequencerError> {
        self.commands
            .send(command)
            .map_err(|_| SequencerError::RouterStopped)
    }

    /// Asks for the next step.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::RouterStopped` once the router has stopped.
    pub fn advance(&self) -> Result<(), SequencerError> {
        self.send(RouterCommand::Advance)
    }

    /// Asks for the previous step.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::RouterStopped` once the router has stopped.
    pub fn step_back(&self) -> Result<(), SequencerError> {
        self.send(RouterCommand::StepBack)
    }

    /// Reports a tap on the mask.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::RouterStopped` once the router has stopped.
    pub fn dismiss(&self) -> Result<(), SequencerError> {
        self.send(RouterCommand::Tap)
    }

    /// Stops the router task after the commands already queued.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::RouterStopped` once the router has stopped.
    pub fn shutdown(&self) -> Result<(), SequencerError> {
        self.send(RouterCommand::Shutdown)
    }

    /// Returns the status once every command queued before this call has
    /// been applied.
    ///
    /// # Errors
    ///
    /// Returns `SequencerError::RouterStopped` once the router has stopped.
    pub async fn status(&self) -> Result<RouterStatus, SequencerError> {
        let (tx, rx) = oneshot::channel();
        self.send(RouterCommand::Snapshot(tx))?;
        rx.await.map_err(|_| SequencerError::RouterStopped)
    }
}

/// Collaborators needed to build a [`TutorialRouter`].
pub struct RouterParams {
    /// Steps for every tutorial.
    pub registry: StepRegistry,
    /// Overlay driven by the session controller.
    pub surface: Arc<dyn MaskSurface>,
    /// Bus carrying inbound requests and outbound lifecycle signals.
    pub bus: SignalBus,
    /// Session behaviour switches.
    pub settings: SessionSettings,
    /// Runtime for completion timers.
    pub runtime: Handle,
    /// Completion flag store.
    pub progress: Arc<dyn ProgressStore>,
    /// Completion analytics.
    pub analytics: Arc<dyn AnalyticsSink>,
}

/// Owns the session controller and feeds it signals and commands.
pub struct TutorialRouter {
    sequencer: Sequencer,
    bus: SignalBus,
    progress: Arc<dyn ProgressStore>,
    analytics: Arc<dyn AnalyticsSink>,
    commands_tx: mpsc::UnboundedSender<RouterCommand>,
    commands: mpsc::UnboundedReceiver<RouterCommand>,
    reports: mpsc::UnboundedReceiver<TimerReport>,
    subscriptions: Vec<Subscription>,
}

impl fmt::Debug for TutorialRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TutorialRouter")
            .field("sequencer", &self.sequencer)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl TutorialRouter {
    /// Builds the session controller and subscribes to the five tutorial
    /// request topics and the five work-done topics.
    #[must_use]
    pub fn new(params: RouterParams) -> Self {
        let RouterParams {
            registry,
            surface,
            bus,
            settings,
            runtime,
            progress,
            analytics,
        } = params;
        let (reports_tx, reports) = mpsc::unbounded_channel();
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let sequencer = Sequencer::new(SequencerParams {
            registry,
            surface,
            bus: bus.clone(),
            settings,
            runtime,
            reports: reports_tx,
        });

        let mut subscriptions =
            Vec::with_capacity(TutorialType::ACTIVE.len() + WorkKind::ALL.len());
        for tutorial in TutorialType::ACTIVE {
            let tx = commands_tx.clone();
            subscriptions.push(bus.subscribe(Topic::Requested(tutorial), move |signal| {
                if let Signal::TutorialRequested(requested) = signal {
                    if tx.send(RouterCommand::Begin(*requested)).is_err() {
                        debug!(tutorial = %requested, "router stopped; request dropped");
                    }
                }
            }));
        }
        for kind in WorkKind::ALL {
            let tx = commands_tx.clone();
            subscriptions.push(bus.subscribe(Topic::WorkDone(kind), move |signal| {
                if let Signal::WorkDone(work) = signal {
                    if tx.send(RouterCommand::WorkDone(work.clone())).is_err() {
                        debug!(kind = ?work.kind(), "router stopped; work event dropped");
                    }
                }
            }));
        }
        debug!(count = subscriptions.len(), "router subscribed to bus");

        Self {
            sequencer,
            bus,
            progress,
            analytics,
            commands_tx,
            commands,
            reports,
            subscriptions,
        }
    }

    /// Returns a command handle for UI code.
    #[must_use]
    pub fn handle(&self) -> RouterHandle {
        RouterHandle {
            commands: self.commands_tx.clone(),
        }
    }

    /// Read access to the session controller.
    #[must_use]
    pub const fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Number of live bus subscriptions held by the router.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Current session status.
    #[must_use]
    pub fn status(&self) -> RouterStatus {
        RouterStatus {
            active: self.sequencer.active_tutorial(),
            current: self.sequencer.current_tutorial(),
            step: self.sequencer.current_step_index(),
            elapsed: self.sequencer.elapsed(),
            mask: self.sequencer.mask_state(),
        }
    }

    /// Applies one command. Returns `ControlFlow::Break` on shutdown.
    pub fn dispatch(&mut self, command: RouterCommand) -> ControlFlow<()> {
        match command {
            RouterCommand::Begin(tutorial) => match self.sequencer.start_tutorial(tutorial) {
                Ok(StartOutcome::Started) => {}
                Ok(StartOutcome::Ignored) => {
                    debug!(%tutorial, "tutorial request ignored");
                }
                Err(e) => warn!(%tutorial, error = %e, "tutorial request rejected"),
            },
            RouterCommand::WorkDone(work) => {
                self.sequencer.finish_on_work_done(&work);
            }
            RouterCommand::Advance => {
                if let Err(e) = self.sequencer.advance_step() {
                    warn!(error = %e, "cannot advance tutorial step");
                }
            }
            RouterCommand::StepBack => {
                if let Err(e) = self.sequencer.step_back() {
                    warn!(error = %e, "cannot step back in tutorial");
                }
            }
            RouterCommand::Tap => self.sequencer.end_tutorial_on_tap(),
            RouterCommand::Snapshot(reply) => {
                if reply.send(self.status()).is_err() {
                    debug!("status requester went away");
                }
            }
            RouterCommand::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Persists, reports and announces one finished session.
    ///
    /// A persistence failure is logged; the analytics event and the
    /// completion signal are still emitted.
    pub fn handle_report(&self, report: &TimerReport) {
        let TimerReport {
            tutorial,
            elapsed,
            ref reason,
        } = *report;

        if let Err(e) = self.progress.mark_completed(tutorial) {
            warn!(%tutorial, error = %e, "failed to persist tutorial completion");
        }
        self.analytics.tutorial_completed(tutorial, elapsed, reason);

        let Some(topic) = Topic::Requested(tutorial).completion_for() else {
            warn!(%tutorial, "no completion topic for tutorial");
            return;
        };
        let signal = Signal::TutorialCompleted { tutorial, elapsed };
        debug_assert_eq!(signal.topic(), topic);
        let delivered = self.bus.publish(&signal);
        info!(%tutorial, ?elapsed, delivered, "tutorial completion announced");
    }

    /// Drops every bus subscription. Later signals no longer reach the router.
    pub fn teardown(&mut self) {
        self.subscriptions.clear();
        debug!("router unsubscribed from bus");
    }

    /// Processes commands and timer reports until shut down.
    ///
    /// A session still running at shutdown is abandoned without a completion.
    /// A session that already ended still has its completion delivered.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                biased;
                Some(report) = self.reports.recv() => self.handle_report(&report),
                command = self.commands.recv() => {
                    let Some(command) = command else { break };
                    if self.dispatch(command).is_break() {
                        break;
                    }
                }
            }
        }
        self.flush_ended_session().await;
        self.teardown();
    }

    /// Delivers the report of a session that ended before shutdown.
    ///
    /// The timer reports on its first tick after the end, so the report may
    /// still be in flight when the shutdown command is applied.
    async fn flush_ended_session(&mut self) {
        if self.sequencer.is_active() {
            return;
        }
        let report = if self.sequencer.timer_running() {
            self.reports.recv().await
        } else {
            self.reports.try_recv().ok()
        };
        if let Some(report) = report {
            debug!(tutorial = %report.tutorial, "delivering completion pending at shutdown");
            self.handle_report(&report);
        }
    }
}
