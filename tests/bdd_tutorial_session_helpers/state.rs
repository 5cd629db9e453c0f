//! Shared behavioural-test state for tutorial session scenarios.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use clap::ValueEnum;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tutorial_sequencer::analytics::TracingAnalytics;
use tutorial_sequencer::overlay::MaskSurface;
use tutorial_sequencer::progress::{MemoryProgressStore, ProgressStore};
use tutorial_sequencer::router::{RouterHandle, RouterParams, RouterStatus, TutorialRouter};
use tutorial_sequencer::session::SessionSettings;
use tutorial_sequencer::signals::{Signal, SignalBus, Subscription, Topic};
use tutorial_sequencer::steps::{StepHandle, StepRegistry, TutorialStep};
use tutorial_sequencer::tutorial::TutorialType;

/// Step result type for tutorial session BDD tests.
pub type StepResult<T> = Result<T, String>;

/// Number of steps registered for every tutorial.
pub const STEPS_PER_TUTORIAL: usize = 3;

/// Step that remembers whether it is highlighted.
#[derive(Default)]
pub struct FlagStep {
    active: AtomicBool,
}

impl FlagStep {
    /// Returns whether the step is highlighted.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl TutorialStep for FlagStep {
    fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

/// Overlay that ignores every call; mask state is read from the router.
struct SilentSurface;

impl MaskSurface for SilentSurface {
    fn set_mask_visible(&self, _visible: bool) {}
    fn set_raycast_blocking(&self, _partial: bool) {}
    fn set_tap_handler(&self, _armed: bool) {}
    fn show_message(&self, _text: &str) {}
    fn hide_message(&self) {}
}

/// A running router on a paused runtime, plus the probes scenarios observe.
pub struct World {
    runtime: Runtime,
    bus: SignalBus,
    handle: RouterHandle,
    steps: Vec<(TutorialType, Vec<Arc<FlagStep>>)>,
    progress: Arc<MemoryProgressStore>,
    completions: Mutex<mpsc::UnboundedReceiver<(TutorialType, Duration)>>,
    _listeners: Vec<Subscription>,
}

impl World {
    /// Builds the router and starts its task.
    pub fn start() -> StepResult<Self> {
        let runtime = Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .map_err(|e| format!("failed to create tokio runtime for scenario: {e}"))?;

        let mut builder = StepRegistry::builder();
        let mut steps = Vec::new();
        for tutorial in TutorialType::ACTIVE {
            let sequence: Vec<Arc<FlagStep>> = (0..STEPS_PER_TUTORIAL)
                .map(|_| Arc::new(FlagStep::default()))
                .collect();
            builder = builder.sequence(
                tutorial,
                sequence.iter().map(|s| Arc::clone(s) as StepHandle),
            );
            steps.push((tutorial, sequence));
        }
        let registry = builder.build().map_err(|e| e.to_string())?;

        let bus = SignalBus::new();
        let (completed_tx, completions) = mpsc::unbounded_channel();
        let mut listeners = Vec::new();
        for tutorial in TutorialType::ACTIVE {
            listeners.push(bus.subscribe(Topic::Began(tutorial), |_| {}));
            let tx = completed_tx.clone();
            listeners.push(bus.subscribe(Topic::Completed(tutorial), move |signal| {
                if let Signal::TutorialCompleted { tutorial, elapsed } = signal {
                    drop(tx.send((*tutorial, *elapsed)));
                }
            }));
        }

        let progress = Arc::new(MemoryProgressStore::new());
        let router = TutorialRouter::new(RouterParams {
            registry,
            surface: Arc::new(SilentSurface),
            bus: bus.clone(),
            settings: SessionSettings::default(),
            runtime: runtime.handle().clone(),
            progress: Arc::clone(&progress) as Arc<dyn ProgressStore>,
            analytics: Arc::new(TracingAnalytics),
        });
        let handle = router.handle();
        drop(runtime.spawn(router.run()));

        Ok(Self {
            runtime,
            bus,
            handle,
            steps,
            progress,
            completions: Mutex::new(completions),
            _listeners: listeners,
        })
    }

    /// Publishes a signal as game code would.
    pub fn publish(&self, signal: &Signal) {
        self.bus.publish(signal);
    }

    /// The router's command handle.
    pub const fn handle(&self) -> &RouterHandle {
        &self.handle
    }

    /// Completion flag store.
    pub fn progress(&self) -> &MemoryProgressStore {
        &self.progress
    }

    /// Lets the router and timers run for `duration` of paused time.
    pub fn pass_time(&self, duration: Duration) {
        self.runtime
            .block_on(async { tokio::time::sleep(duration).await });
    }

    /// Status after every queued command has been applied.
    pub fn status(&self) -> StepResult<RouterStatus> {
        self.runtime
            .block_on(self.handle.status())
            .map_err(|e| e.to_string())
    }

    /// Waits for the next completion signal.
    pub fn next_completion(&self) -> StepResult<(TutorialType, Duration)> {
        let mut completions = self
            .completions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.runtime
            .block_on(async {
                tokio::time::timeout(Duration::from_secs(60), completions.recv()).await
            })
            .map_err(|_| String::from("no completion within a minute"))?
            .ok_or_else(|| String::from("completion channel closed"))
    }

    /// Returns a completion already delivered, without waiting.
    pub fn pending_completion(&self) -> Option<(TutorialType, Duration)> {
        self.completions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .try_recv()
            .ok()
    }

    /// Highlight flags of a tutorial's steps.
    pub fn highlighted(&self, tutorial: TutorialType) -> Vec<bool> {
        self.steps
            .iter()
            .find(|(t, _)| *t == tutorial)
            .map(|(_, steps)| steps.iter().map(|s| s.is_active()).collect())
            .unwrap_or_default()
    }
}

/// Parses a snake-case tutorial name from a step.
pub fn parse_tutorial(name: &str) -> StepResult<TutorialType> {
    TutorialType::from_str(name, false).map_err(|e| format!("unknown tutorial {name}: {e}"))
}

/// Shared scenario state for tutorial session behavioural tests.
#[derive(Default, ScenarioState)]
pub struct TutorialSessionState {
    /// The running router and its probes.
    pub(crate) world: Slot<Arc<World>>,
}

impl TutorialSessionState {
    /// Returns the scenario's world.
    pub fn world(&self) -> StepResult<Arc<World>> {
        self.world
            .get()
            .ok_or_else(|| String::from("tutorial router should be started"))
    }
}

/// Fixture providing fresh state for each tutorial session scenario.
#[fixture]
pub fn tutorial_session_state() -> TutorialSessionState {
    TutorialSessionState::default()
}
