//! Headless tutorial session runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::ValueEnum;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::console::{ConsoleSurface, console_registry};
use crate::analytics::TracingAnalytics;
use crate::error::{Result, TutorialError};
use crate::progress::ProgressStore;
use crate::router::{RouterParams, TutorialRouter};
use crate::session::SessionSettings;
use crate::signals::{Signal, SignalBus, Topic, WorkDone};
use crate::tutorial::TutorialType;

/// How a simulated session finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FinishMode {
    /// The subsystem the tutorial teaches reports finished work.
    #[default]
    Work,
    /// The player taps the mask.
    Tap,
    /// The session is left running and abandoned.
    None,
}

/// Inputs replayed against a tutorial session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationScript {
    /// Tutorial to request.
    pub tutorial: TutorialType,
    /// Number of advance commands sent after the start.
    pub advance: usize,
    /// Number of step-back commands sent after advancing.
    pub back: usize,
    /// Time spent in the tutorial before finishing.
    pub dwell: Duration,
    /// How the session finishes.
    pub finish: FinishMode,
}

/// What happened during a simulated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    /// Tutorial that was requested.
    pub tutorial: TutorialType,
    /// The tutorial's completion flag was already set before the run.
    pub previously_completed: bool,
    /// The begin signal was published.
    pub began: bool,
    /// Step cursor after navigation.
    pub step: Option<usize>,
    /// Number of steps in the tutorial.
    pub step_count: usize,
    /// Elapsed time carried by the completion signal, if one fired.
    pub completion: Option<Duration>,
}

fn sample_work(tutorial: TutorialType) -> Option<WorkDone> {
    match tutorial {
        TutorialType::None => None,
        TutorialType::Gathering => Some(WorkDone::GatheringExited),
        TutorialType::Crafting => Some(WorkDone::ElementCrafted {
            element: String::from("steam"),
            parent_a: String::from("fire"),
            parent_b: String::from("water"),
            new_discovery: true,
        }),
        TutorialType::BuyHint => Some(WorkDone::HintPurchased {
            element: String::from("fire"),
        }),
        TutorialType::UpgradePowerup => Some(WorkDone::PowerupUpgraded {
            powerup: String::from("magnet"),
            level: 2,
        }),
        TutorialType::TierSwitch => Some(WorkDone::TierLoaded { tier: 2 }),
    }
}

/// Replays `script` against a fresh router on the current runtime.
///
/// # Errors
///
/// Returns an error when the tutorial has no completion flag, the progress
/// store cannot be read, or the router task fails.
pub async fn run_simulation(
    progress: Arc<dyn ProgressStore>,
    settings: SessionSettings,
    script: &SimulationScript,
) -> Result<SimulationReport> {
    let tutorial = script.tutorial;
    let previously_completed = progress.is_completed(tutorial)?;
    let registry = console_registry()?;
    let step_count = registry.step_count(tutorial);

    let bus = SignalBus::new();
    let began = Arc::new(AtomicBool::new(false));
    let began_flag = Arc::clone(&began);
    let _began_listener = bus.subscribe(Topic::Began(tutorial), move |_| {
        began_flag.store(true, Ordering::SeqCst);
    });
    let (completed_tx, mut completed) = mpsc::unbounded_channel();
    let _completion_listener = bus.subscribe(Topic::Completed(tutorial), move |signal| {
        if let Signal::TutorialCompleted { elapsed, .. } = signal {
            if completed_tx.send(*elapsed).is_err() {
                debug!("simulation finished before completion arrived");
            }
        }
    });

    let router = TutorialRouter::new(RouterParams {
        registry,
        surface: Arc::new(ConsoleSurface),
        bus: bus.clone(),
        settings,
        runtime: Handle::current(),
        progress,
        analytics: Arc::new(TracingAnalytics),
    });
    let handle = router.handle();
    let task = tokio::spawn(router.run());

    bus.publish(&Signal::TutorialRequested(tutorial));
    for _ in 0..script.advance {
        handle.advance()?;
    }
    for _ in 0..script.back {
        handle.step_back()?;
    }
    let status = handle.status().await?;
    tokio::time::sleep(script.dwell).await;

    let completion = if status.active.is_some() {
        match script.finish {
            FinishMode::Work => {
                if let Some(work) = sample_work(tutorial) {
                    bus.publish(&Signal::WorkDone(work));
                }
                completed.recv().await
            }
            FinishMode::Tap => {
                handle.dismiss()?;
                completed.recv().await
            }
            FinishMode::None => None,
        }
    } else {
        None
    };

    handle.shutdown()?;
    task.await.map_err(|e| TutorialError::Runtime {
        message: format!("router task failed: {e}"),
    })?;

    let report = SimulationReport {
        tutorial,
        previously_completed,
        began: began.load(Ordering::SeqCst),
        step: status.step,
        step_count,
        completion,
    };
    info!(%tutorial, completed = report.completion.is_some(), "simulation finished");
    Ok(report)
}
