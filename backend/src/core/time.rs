//! Simulated time for the scheduler
//!
//! Time is kept as whole microseconds. Job loads and timeouts are expressed
//! in seconds at the edges, but every accumulation inside the simulation is
//! integer arithmetic, so 100 slices of 0.1s land exactly on 10.0s.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

const MICROS_PER_SEC: f64 = 1_000_000.0;

/// A span of simulated time
///
/// # Example
/// ```
/// use cluster_simulator_core_rs::SimDuration;
///
/// let slice = SimDuration::from_secs_f64(0.1);
/// assert_eq!(slice.as_micros(), 100_000);
/// assert_eq!((slice * 100).as_secs_f64(), 10.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimDuration(u64);

impl SimDuration {
    pub const ZERO: SimDuration = SimDuration(0);

    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1_000_000)
    }

    /// Convert seconds to a duration, rounding to the nearest microsecond
    ///
    /// # Panics
    /// Panics if `secs` is negative or not finite
    pub fn from_secs_f64(secs: f64) -> Self {
        assert!(
            secs.is_finite() && secs >= 0.0,
            "duration must be finite and non-negative"
        );
        Self((secs * MICROS_PER_SEC).round() as u64)
    }

    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / MICROS_PER_SEC
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_sub(self, other: SimDuration) -> SimDuration {
        SimDuration(self.0.saturating_sub(other.0))
    }
}

impl Add for SimDuration {
    type Output = SimDuration;

    fn add(self, rhs: SimDuration) -> SimDuration {
        SimDuration(self.0 + rhs.0)
    }
}

impl AddAssign for SimDuration {
    fn add_assign(&mut self, rhs: SimDuration) {
        self.0 += rhs.0;
    }
}

impl std::ops::Mul<u64> for SimDuration {
    type Output = SimDuration;

    fn mul(self, rhs: u64) -> SimDuration {
        SimDuration(self.0 * rhs)
    }
}

impl fmt::Display for SimDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}s", self.as_secs_f64())
    }
}

/// An instant on the simulated timeline, measured from simulation start
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime(u64);

impl SimTime {
    pub const START: SimTime = SimTime(0);

    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / MICROS_PER_SEC
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future
    pub fn duration_since(&self, earlier: SimTime) -> SimDuration {
        SimDuration(self.0.saturating_sub(earlier.0))
    }
}

impl Add<SimDuration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimDuration) -> SimTime {
        SimTime(self.0 + rhs.0)
    }
}

impl Sub for SimTime {
    type Output = SimDuration;

    fn sub(self, rhs: SimTime) -> SimDuration {
        self.duration_since(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.as_secs_f64())
    }
}

/// Monotonic simulation clock
///
/// Only the simulation engine moves the clock; actors observe it through
/// their context.
///
/// # Example
/// ```
/// use cluster_simulator_core_rs::{SimClock, SimDuration, SimTime};
///
/// let mut clock = SimClock::new();
/// assert_eq!(clock.now(), SimTime::START);
///
/// clock.advance(SimDuration::from_millis(100));
/// assert_eq!(clock.now().as_micros(), 100_000);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    now: SimTime,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Advance the clock by a duration
    pub fn advance(&mut self, by: SimDuration) {
        self.now = self.now + by;
    }

    /// Jump the clock forward to `time`
    ///
    /// # Panics
    /// Panics if `time` is earlier than the current time
    pub fn advance_to(&mut self, time: SimTime) {
        assert!(time >= self.now, "simulated time cannot move backwards");
        self.now = time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "simulated time cannot move backwards")]
    fn test_clock_rejects_backwards_jump() {
        let mut clock = SimClock::new();
        clock.advance(SimDuration::from_secs(2));
        clock.advance_to(SimTime::from_micros(1));
    }

    #[test]
    #[should_panic(expected = "duration must be finite and non-negative")]
    fn test_negative_duration_panics() {
        SimDuration::from_secs_f64(-0.5);
    }

    #[test]
    fn test_slices_accumulate_exactly() {
        let slice = SimDuration::from_secs_f64(0.1);
        let mut elapsed = SimDuration::ZERO;
        for _ in 0..100 {
            elapsed += slice;
        }
        assert_eq!(elapsed, SimDuration::from_secs(10));
    }
}
