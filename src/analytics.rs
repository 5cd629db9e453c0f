//! Completion analytics.

use std::time::Duration;

use tracing::info;

use crate::session::EndReason;
use crate::tutorial::TutorialType;

/// Receives one event per completed tutorial session.
#[cfg_attr(test, mockall::automock)]
pub trait AnalyticsSink: Send + Sync {
    /// Records that `tutorial` finished after `elapsed`.
    fn tutorial_completed(&self, tutorial: TutorialType, elapsed: Duration, reason: &EndReason);
}

/// Sink that writes completion events to the `tutorseq::analytics` log target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn tutorial_completed(&self, tutorial: TutorialType, elapsed: Duration, reason: &EndReason) {
        let dismissed = matches!(reason, EndReason::Tap)
            || matches!(reason, EndReason::Work(work) if work.is_dismissal());
        info!(
            target: "tutorseq::analytics",
            %tutorial,
            elapsed_ms = elapsed.as_millis(),
            dismissed,
            "tutorial completed"
        );
    }
}
