//! Completion timer for a running tutorial session.
//!
//! The timer is a cooperative task: it wakes on a fixed tick, adds the time
//! since its previous tick to the running total and checks the stop flag.
//! Stopping is never preemptive. The flag carries the instant the session
//! ended, so the final figure covers exactly the span from start to end
//! regardless of where that instant falls between ticks.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, trace};

use super::{EndReason, TimerReport};
use crate::tutorial::TutorialType;

#[derive(Debug, Clone)]
pub(super) struct StopRequest {
    at: Instant,
    reason: EndReason,
}

/// Handle to the timer task of one session.
#[derive(Debug)]
pub(super) struct SessionTimer {
    stop: watch::Sender<Option<StopRequest>>,
    elapsed: watch::Receiver<Duration>,
    task: JoinHandle<()>,
}

impl SessionTimer {
    /// Starts timing `tutorial` on `runtime`.
    pub(super) fn spawn(
        runtime: &Handle,
        tutorial: TutorialType,
        tick: Duration,
        reports: mpsc::UnboundedSender<TimerReport>,
    ) -> Self {
        let (stop, stop_rx) = watch::channel(None);
        let (elapsed_tx, elapsed) = watch::channel(Duration::ZERO);
        let started_at = Instant::now();
        let task = runtime.spawn(run(TimerTask {
            tutorial,
            tick,
            started_at,
            stop: stop_rx,
            elapsed: elapsed_tx,
            reports,
        }));
        Self {
            stop,
            elapsed,
            task,
        }
    }

    /// Asks the task to finish on its next tick. Later requests are ignored.
    pub(super) fn stop(&self, reason: EndReason) {
        let at = Instant::now();
        self.stop.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(StopRequest { at, reason });
            true
        });
    }

    /// Time accumulated so far.
    pub(super) fn elapsed(&self) -> Duration {
        *self.elapsed.borrow()
    }

    /// Returns whether the task has exited.
    pub(super) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

struct TimerTask {
    tutorial: TutorialType,
    tick: Duration,
    started_at: Instant,
    stop: watch::Receiver<Option<StopRequest>>,
    elapsed: watch::Sender<Duration>,
    reports: mpsc::UnboundedSender<TimerReport>,
}

async fn run(mut task: TimerTask) {
    let mut interval = tokio::time::interval(task.tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last = task.started_at;
    let mut elapsed = Duration::ZERO;

    loop {
        interval.tick().await;

        let request = task.stop.borrow_and_update().clone();
        if let Some(StopRequest { at, reason }) = request {
            elapsed = elapsed.saturating_add(at.saturating_duration_since(last));
            task.elapsed.send_replace(elapsed);
            debug!(tutorial = %task.tutorial, ?elapsed, "completion timer stopped");
            let report = TimerReport {
                tutorial: task.tutorial,
                elapsed,
                reason,
            };
            if task.reports.send(report).is_err() {
                debug!(tutorial = %task.tutorial, "no receiver for timer report");
            }
            return;
        }

        if task.stop.has_changed().is_err() {
            debug!(tutorial = %task.tutorial, "session dropped; abandoning completion timer");
            return;
        }

        let now = Instant::now();
        elapsed = elapsed.saturating_add(now.saturating_duration_since(last));
        last = now;
        task.elapsed.send_replace(elapsed);
        trace!(tutorial = %task.tutorial, ?elapsed, "completion timer tick");
    }
}
