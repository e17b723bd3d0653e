//! Result aggregation
//!
//! The aggregator is the only mutable state shared between workers. Every
//! update takes the lock once, so a job's outcome is one increment applied
//! exactly once.
//!
//! # Critical Invariants
//!
//! 1. `total_success + Σ error_histogram == completed jobs` at every instant
//! 2. Histogram keys appear only after their first failure
//! 3. `total_failures` in a summary is derived, never counted separately

use crate::models::job::{ErrorCode, JobError, JobOutcome};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default)]
struct Tally {
    total_success: u64,
    error_histogram: BTreeMap<ErrorCode, u64>,
}

/// Thread-safe outcome counters
///
/// # Example
/// ```
/// use cluster_simulator_core_rs::{ErrorCode, ResultAggregator};
///
/// let aggregator = ResultAggregator::new();
/// aggregator.record_success();
/// aggregator.record_failure(ErrorCode::Timeout);
///
/// let summary = aggregator.summary(2);
/// assert_eq!(summary.total_success, 1);
/// assert_eq!(summary.total_failures, 1);
/// assert_eq!(summary.histogram.get("-1"), Some(&1));
/// ```
#[derive(Debug, Default)]
pub struct ResultAggregator {
    tally: Mutex<Tally>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.tally.lock().total_success += 1;
    }

    pub fn record_failure(&self, code: ErrorCode) {
        *self.tally.lock().error_histogram.entry(code).or_insert(0) += 1;
    }

    /// Record a resolved outcome; pending outcomes are rejected
    pub fn record(&self, outcome: &JobOutcome) -> Result<(), JobError> {
        match outcome {
            JobOutcome::Pending => Err(JobError::PendingOutcome),
            JobOutcome::Success => {
                self.record_success();
                Ok(())
            }
            JobOutcome::Error(code) => {
                self.record_failure(code.clone());
                Ok(())
            }
        }
    }

    pub fn total_success(&self) -> u64 {
        self.tally.lock().total_success
    }

    /// Number of failures recorded for `code`
    pub fn failures_for(&self, code: &ErrorCode) -> u64 {
        self.tally
            .lock()
            .error_histogram
            .get(code)
            .copied()
            .unwrap_or(0)
    }

    /// Jobs whose outcome has been recorded
    pub fn completed(&self) -> u64 {
        let tally = self.tally.lock();
        tally.total_success + tally.error_histogram.values().sum::<u64>()
    }

    /// Final report for a run of `total_jobs` jobs
    ///
    /// Only meaningful once every worker has exited.
    pub fn summary(&self, total_jobs: u64) -> RunSummary {
        let tally = self.tally.lock();
        let mut histogram = BTreeMap::new();
        // A historical code labelled "-1" folds into the timeout bucket
        for (code, count) in &tally.error_histogram {
            *histogram.entry(code.label().to_string()).or_insert(0) += *count;
        }
        RunSummary {
            total_jobs,
            total_success: tally.total_success,
            total_failures: total_jobs.saturating_sub(tally.total_success),
            histogram,
        }
    }
}

/// End-of-run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_jobs: u64,
    pub total_success: u64,
    pub total_failures: u64,

    /// Error code label → failures, timeout reported as `-1`
    pub histogram: BTreeMap<String, u64>,
}

impl RunSummary {
    /// Fraction of jobs that succeeded (0.0 for an empty run)
    pub fn success_rate(&self) -> f64 {
        if self.total_jobs == 0 {
            return 0.0;
        }
        self.total_success as f64 / self.total_jobs as f64
    }

    /// Failures attributed to a specific code label
    pub fn failures_for(&self, label: &str) -> u64 {
        self.histogram.get(label).copied().unwrap_or(0)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation Summary ===")?;
        writeln!(f, "Total jobs: {}", self.total_jobs)?;
        writeln!(f, "Successful jobs: {}", self.total_success)?;
        writeln!(f, "Failed jobs: {}", self.total_failures)?;
        if self.total_failures > 0 {
            writeln!(f, "Failure details:")?;
            for (label, count) in &self.histogram {
                writeln!(f, "  Error code {}: {}", label, count)?;
            }
        }
        write!(f, "==========================")
    }
}
