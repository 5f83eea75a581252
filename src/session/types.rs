//! Types shared by the acquisition loop and its callers

use crate::backend::SourceStats;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Why acquisition stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StopReason {
    /// Elapsed time exceeded the configured ceiling
    TimeLimit,
    /// The viewer window was closed
    ViewerClosed,
    /// The source has no more data
    SourceExhausted,
}

impl StopReason {
    /// Display name for the reason
    pub fn display_name(&self) -> &'static str {
        match self {
            StopReason::TimeLimit => "Time limit reached",
            StopReason::ViewerClosed => "Viewer closed",
            StopReason::SourceExhausted => "Source exhausted",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Lifecycle of an acquisition loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    /// Pulling batches
    #[default]
    Running,
    /// A stop condition held; the loop will not pull again
    StopRequested(StopReason),
    /// Source and sink have been closed
    Stopped(StopReason),
}

impl LoopState {
    /// Check if still pulling samples
    pub fn is_running(&self) -> bool {
        matches!(self, LoopState::Running)
    }

    /// Check if resources have been released
    pub fn is_stopped(&self) -> bool {
        matches!(self, LoopState::Stopped(_))
    }

    /// The stop reason, once one is known
    pub fn reason(&self) -> Option<StopReason> {
        match self {
            LoopState::Running => None,
            LoopState::StopRequested(r) | LoopState::Stopped(r) => Some(*r),
        }
    }
}

/// How a batch is merged into the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertOrder {
    /// Each sample is pushed to the front; the newest sample is first
    #[default]
    LatestFirst,
    /// Each sample is pushed to the back, in arrival order
    Forward,
}

/// Knobs of one acquisition run
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionSettings {
    /// Samples pulled per iteration
    pub batch_size: usize,
    /// Buffer window; `None` keeps everything
    pub window: Option<usize>,
    /// Stop once this much time has elapsed
    pub time_limit: Option<Duration>,
    pub order: InsertOrder,
    /// Field whose batch range becomes the viewer's x limits
    pub x_column: Option<String>,
}

impl Default for AcquisitionSettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            window: Some(200),
            time_limit: None,
            order: InsertOrder::LatestFirst,
            x_column: None,
        }
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub reason: StopReason,
    pub iterations: u64,
    /// Samples pulled from the source
    pub samples: u64,
    /// Samples persisted by the sink
    pub samples_written: u64,
    pub elapsed: Duration,
    #[serde(skip)]
    pub source_stats: SourceStats,
}

impl RunSummary {
    /// Average sample rate over the run
    pub fn samples_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.samples as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_state_reason() {
        assert_eq!(LoopState::Running.reason(), None);
        assert!(LoopState::default().is_running());

        let requested = LoopState::StopRequested(StopReason::TimeLimit);
        assert!(!requested.is_running());
        assert!(!requested.is_stopped());
        assert_eq!(requested.reason(), Some(StopReason::TimeLimit));

        let stopped = LoopState::Stopped(StopReason::ViewerClosed);
        assert!(stopped.is_stopped());
        assert_eq!(stopped.reason(), Some(StopReason::ViewerClosed));
    }

    #[test]
    fn test_samples_per_second() {
        let summary = RunSummary {
            reason: StopReason::SourceExhausted,
            iterations: 3,
            samples: 50,
            samples_written: 50,
            elapsed: Duration::from_secs(2),
            source_stats: SourceStats::default(),
        };
        assert_eq!(summary.samples_per_second(), 25.0);
        assert_eq!(summary.reason.to_string(), "Source exhausted");
    }
}
