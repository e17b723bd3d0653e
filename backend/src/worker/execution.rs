//! Slice-by-slice job execution with a hard ceiling
//!
//! A job advances in fixed slices until its load is exhausted. The ceiling
//! is checked before completion: a job whose elapsed time has reached the
//! ceiling is aborted even if that same slice exhausted its load. As a
//! consequence every load below the ceiling completes and every load at or
//! above it times out.

use crate::core::time::SimDuration;
use serde::{Deserialize, Serialize};

/// Slice and ceiling used by every worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPolicy {
    /// Processing quantum
    pub slice: SimDuration,

    /// Elapsed time at which a job is aborted
    pub ceiling: SimDuration,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self {
            slice: SimDuration::from_millis(100),
            ceiling: SimDuration::from_secs(10),
        }
    }
}

/// Next action for a job in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceStep {
    /// Sleep for this long, then check again
    Advance(SimDuration),

    /// Load exhausted under the ceiling
    Completed,

    /// Ceiling reached
    TimedOut,
}

/// Pure replay of a job's execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionTrace {
    pub timed_out: bool,
    pub elapsed: SimDuration,
    pub slices: u32,
}

impl ExecutionPolicy {
    pub fn new(slice: SimDuration, ceiling: SimDuration) -> Self {
        Self { slice, ceiling }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.slice.is_zero() {
            return Err("execution slice must be > 0".to_string());
        }
        if self.ceiling.is_zero() {
            return Err("execution ceiling must be > 0".to_string());
        }
        Ok(())
    }

    /// Convert a job load in seconds to simulated time
    ///
    /// Rounding to the microsecond never moves a load across the ceiling:
    /// a load below the ceiling stays at least one microsecond short of it,
    /// and a load at or above it reaches it.
    pub fn load_duration(&self, load_secs: f64) -> SimDuration {
        let load = SimDuration::from_secs_f64(load_secs);
        let below_ceiling = load_secs < self.ceiling.as_secs_f64();

        if below_ceiling && load >= self.ceiling {
            self.ceiling.saturating_sub(SimDuration::from_micros(1))
        } else if !below_ceiling && load < self.ceiling {
            self.ceiling
        } else {
            load
        }
    }

    /// Decide what happens to a job with `load` after `elapsed` of processing
    pub fn next_step(&self, load: SimDuration, elapsed: SimDuration) -> SliceStep {
        if elapsed >= self.ceiling {
            SliceStep::TimedOut
        } else if elapsed >= load {
            SliceStep::Completed
        } else {
            SliceStep::Advance(self.slice.min(load.saturating_sub(elapsed)))
        }
    }

    /// Run a job to its end without an engine
    ///
    /// # Example
    /// ```
    /// use cluster_simulator_core_rs::worker::ExecutionPolicy;
    /// use cluster_simulator_core_rs::SimDuration;
    ///
    /// let policy = ExecutionPolicy::default();
    ///
    /// let short = policy.run_to_end(SimDuration::from_secs_f64(9.95));
    /// assert!(!short.timed_out);
    ///
    /// let long = policy.run_to_end(SimDuration::from_secs_f64(12.0));
    /// assert!(long.timed_out);
    /// assert_eq!(long.elapsed, SimDuration::from_secs(10));
    /// ```
    pub fn run_to_end(&self, load: SimDuration) -> ExecutionTrace {
        let mut elapsed = SimDuration::ZERO;
        let mut slices = 0;
        loop {
            match self.next_step(load, elapsed) {
                SliceStep::Advance(step) => {
                    elapsed += step;
                    slices += 1;
                }
                SliceStep::Completed => {
                    return ExecutionTrace {
                        timed_out: false,
                        elapsed,
                        slices,
                    }
                }
                SliceStep::TimedOut => {
                    return ExecutionTrace {
                        timed_out: true,
                        elapsed,
                        slices,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_slice_is_partial() {
        let policy = ExecutionPolicy::default();
        let load = SimDuration::from_secs_f64(1.25);

        assert_eq!(
            policy.next_step(load, SimDuration::from_millis(1200)),
            SliceStep::Advance(SimDuration::from_millis(50))
        );

        let trace = policy.run_to_end(load);
        assert_eq!(trace.elapsed, load);
        assert_eq!(trace.slices, 13);
    }

    #[test]
    fn test_load_equal_to_ceiling_times_out() {
        let policy = ExecutionPolicy::default();
        let trace = policy.run_to_end(SimDuration::from_secs(10));

        assert!(trace.timed_out);
        assert_eq!(trace.slices, 100);
    }

    #[test]
    fn test_ceiling_not_multiple_of_slice() {
        let policy = ExecutionPolicy::new(SimDuration::from_millis(300), SimDuration::from_secs(1));
        let trace = policy.run_to_end(SimDuration::from_secs(5));

        assert!(trace.timed_out);
        assert_eq!(trace.elapsed, SimDuration::from_millis(1200));
    }

    #[test]
    fn test_load_just_below_ceiling_stays_below() {
        let policy = ExecutionPolicy::default();

        let load = policy.load_duration(9.9999997);
        assert_eq!(load, SimDuration::from_micros(9_999_999));
        assert!(!policy.run_to_end(load).timed_out);

        assert_eq!(policy.load_duration(10.0), policy.ceiling);
        assert_eq!(policy.load_duration(2.5), SimDuration::from_millis(2_500));
    }

    #[test]
    fn test_validate() {
        assert!(ExecutionPolicy::default().validate().is_ok());
        assert!(ExecutionPolicy::new(SimDuration::ZERO, SimDuration::from_secs(1))
            .validate()
            .is_err());
    }
}
