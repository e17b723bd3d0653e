//! Job model
//!
//! A job is the unit of work the dispatcher hands to a worker:
//! - Sequence-assigned identifier (`job0`, `job1`, ...)
//! - Simulated load in seconds
//! - Outcome (Pending until the processing worker resolves it)
//!
//! Jobs are moved into a worker's inbox and never shared; the outcome is
//! written exactly once.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Sequence-assigned job identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Identifier for the job at position `seq` in the dispatch stream
    pub fn from_sequence(seq: usize) -> Self {
        Self(format!("job{}", seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure cause recorded for a job
///
/// Ordering puts `Timeout` first, then historical codes by label, which is
/// the order used when printing the failure histogram.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Job was aborted at the execution ceiling
    Timeout,

    /// Error label drawn from the site's historical frequency table
    Historical(String),
}

impl ErrorCode {
    /// Numeric label used for timeouts in reports
    pub const TIMEOUT_LABEL: &'static str = "-1";

    pub fn historical(label: impl Into<String>) -> Self {
        ErrorCode::Historical(label.into())
    }

    pub fn label(&self) -> &str {
        match self {
            ErrorCode::Timeout => Self::TIMEOUT_LABEL,
            ErrorCode::Historical(label) => label,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ErrorCode::Timeout)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Job outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutcome {
    /// Not processed yet
    Pending,

    /// Completed under the ceiling and no error was injected
    Success,

    /// Timed out or failed with an injected historical error
    Error(ErrorCode),
}

impl JobOutcome {
    pub fn is_pending(&self) -> bool {
        matches!(self, JobOutcome::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success)
    }

    pub fn error_code(&self) -> Option<&ErrorCode> {
        match self {
            JobOutcome::Error(code) => Some(code),
            _ => None,
        }
    }
}

/// Errors that can occur when resolving a job
#[derive(Debug, Error, PartialEq)]
pub enum JobError {
    #[error("Job {job_id} already resolved as {outcome:?}")]
    AlreadyResolved { job_id: JobId, outcome: JobOutcome },

    #[error("Cannot record a pending outcome")]
    PendingOutcome,
}

/// A unit of simulated work
///
/// # Example
/// ```
/// use cluster_simulator_core_rs::{Job, JobId, JobOutcome};
///
/// let mut job = Job::new(JobId::from_sequence(7), 4.5);
/// assert_eq!(job.id().as_str(), "job7");
/// assert!(job.outcome().is_pending());
///
/// job.resolve(JobOutcome::Success).unwrap();
/// assert!(job.resolve(JobOutcome::Success).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,

    /// Simulated processing time required (seconds)
    load: f64,

    outcome: JobOutcome,
}

impl Job {
    /// Create a pending job
    ///
    /// # Panics
    /// Panics if load is not a positive finite number
    pub fn new(id: JobId, load: f64) -> Self {
        assert!(load.is_finite() && load > 0.0, "load must be positive");
        Self {
            id,
            load,
            outcome: JobOutcome::Pending,
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn outcome(&self) -> &JobOutcome {
        &self.outcome
    }

    /// Set the final outcome
    ///
    /// Fails if the job was already resolved or if `outcome` is `Pending`.
    pub fn resolve(&mut self, outcome: JobOutcome) -> Result<(), JobError> {
        if outcome.is_pending() {
            return Err(JobError::PendingOutcome);
        }
        if !self.outcome.is_pending() {
            return Err(JobError::AlreadyResolved {
                job_id: self.id.clone(),
                outcome: self.outcome.clone(),
            });
        }
        self.outcome = outcome;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "load must be positive")]
    fn test_zero_load_panics() {
        Job::new(JobId::from_sequence(0), 0.0);
    }

    #[test]
    #[should_panic(expected = "load must be positive")]
    fn test_nan_load_panics() {
        Job::new(JobId::from_sequence(0), f64::NAN);
    }

    #[test]
    fn test_resolve_pending_rejected() {
        let mut job = Job::new(JobId::from_sequence(1), 2.0);
        assert_eq!(job.resolve(JobOutcome::Pending), Err(JobError::PendingOutcome));
        assert!(job.outcome().is_pending());
    }

    #[test]
    fn test_resolve_twice_keeps_first_outcome() {
        let mut job = Job::new(JobId::from_sequence(2), 12.0);
        job.resolve(JobOutcome::Error(ErrorCode::Timeout)).unwrap();

        let err = job.resolve(JobOutcome::Success).unwrap_err();
        assert!(matches!(err, JobError::AlreadyResolved { .. }));
        assert_eq!(job.outcome().error_code(), Some(&ErrorCode::Timeout));
    }

    #[test]
    fn test_timeout_sorts_before_historical_codes() {
        let mut codes = vec![
            ErrorCode::historical("137"),
            ErrorCode::Timeout,
            ErrorCode::historical("1"),
        ];
        codes.sort();
        assert_eq!(codes[0], ErrorCode::Timeout);
        assert_eq!(codes[1].label(), "1");
        assert_eq!(ErrorCode::Timeout.to_string(), "-1");
    }
}
