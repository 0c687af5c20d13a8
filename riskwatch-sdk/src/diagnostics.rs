//! Connectivity diagnostics, kept separate from event delivery.
//!
//! Observers only ever see successfully fetched events. Anything that wants
//! to show connection health (a status light, a log line, a metric) installs
//! a [`DiagnosticsHook`] or reads [`NotifierHealth`] instead.

use std::sync::Arc;

use riskwatch_types::EventTimestamp;
use tokio::time::Instant;

use crate::FetchError;

/// Callback invoked once per completed poll cycle.
pub type DiagnosticsHook = Arc<dyn Fn(&PollReport) + Send + Sync>;

/// What happened during one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// New events were fetched and handed to observers.
    Delivered {
        /// Number of events in the batch.
        events: usize,
        /// Observer invocations that panicked during delivery.
        observer_panics: usize,
    },
    /// The request succeeded but there was nothing new.
    Empty,
    /// The request failed; the watermark was left unchanged.
    Failed(FetchError),
}

/// Summary of one poll cycle, handed to the diagnostics hook.
#[derive(Debug, Clone, PartialEq)]
pub struct PollReport {
    /// 1-based cycle counter for this notifier.
    pub cycle: u64,
    /// Result of the cycle.
    pub outcome: PollOutcome,
    /// Watermark after the cycle.
    pub watermark: Option<EventTimestamp>,
}

impl PollReport {
    /// Check if the cycle failed.
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, PollOutcome::Failed(_))
    }
}

/// Running health counters for a notifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotifierHealth {
    /// Completed poll cycles.
    pub cycles: u64,
    /// Failures since the last successful cycle.
    pub consecutive_failures: u32,
    /// Most recent failure, cleared on success.
    pub last_error: Option<FetchError>,
    /// When the last successful cycle finished.
    pub last_success: Option<Instant>,
}

impl NotifierHealth {
    /// True when the most recent cycle succeeded (or none has run yet).
    pub fn is_healthy(&self) -> bool {
        self.consecutive_failures == 0
    }

    pub(crate) fn record(&mut self, outcome: &PollOutcome) {
        self.cycles += 1;
        match outcome {
            PollOutcome::Failed(err) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.last_error = Some(err.clone());
            }
            PollOutcome::Delivered { .. } | PollOutcome::Empty => {
                self.consecutive_failures = 0;
                self.last_error = None;
                self.last_success = Some(Instant::now());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_accumulate_until_success() {
        let mut health = NotifierHealth::default();
        assert!(health.is_healthy());

        health.record(&PollOutcome::Failed(FetchError::Timeout));
        health.record(&PollOutcome::Failed(FetchError::Timeout));
        assert_eq!(health.consecutive_failures, 2);
        assert_eq!(health.last_error, Some(FetchError::Timeout));
        assert!(!health.is_healthy());

        health.record(&PollOutcome::Empty);
        assert_eq!(health.cycles, 3);
        assert!(health.is_healthy());
        assert!(health.last_error.is_none());
        assert!(health.last_success.is_some());
    }

    #[test]
    fn report_flags_failures() {
        let report = PollReport {
            cycle: 1,
            outcome: PollOutcome::Failed(FetchError::Connection("refused".into())),
            watermark: None,
        };
        assert!(report.is_failure());
    }
}
