//! xorshift64* random number generator
//!
//! 64 bits of state, trivially seedable.
//!
//! # Determinism
//!
//! Same seed → same sequence. The dispatcher owns one generator for job
//! loads and each worker owns a forked generator for error injection, so a
//! run is reproducible regardless of how actors interleave.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use cluster_simulator_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let load = rng.uniform(1.0, 15.0);
/// assert!((1.0..15.0).contains(&load));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed
    ///
    /// A zero seed is mapped to 1 (xorshift never leaves the zero state).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Generate random f64 in range [0.0, 1.0)
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        // Top 53 bits → [0, 1)
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Generate random f64 in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn uniform(&mut self, min: f64, max: f64) -> f64 {
        assert!(min < max, "min must be less than max");
        let value = min + self.next_f64() * (max - min);
        // Rounding can land on max for very narrow ranges
        if value >= max {
            min
        } else {
            value
        }
    }

    /// Derive an independent generator for sub-stream `stream`
    ///
    /// The parent is not advanced, so forking workers 0..W from the same
    /// parent always yields the same W streams.
    ///
    /// # Example
    /// ```
    /// use cluster_simulator_core_rs::RngManager;
    ///
    /// let root = RngManager::new(7);
    /// let mut a = root.fork(0);
    /// let mut b = root.fork(1);
    /// assert_ne!(a.next(), b.next());
    /// ```
    pub fn fork(&self, stream: u64) -> RngManager {
        RngManager::new(splitmix64(self.state ^ splitmix64(stream.wrapping_add(1))))
    }

    /// Get current RNG state (for replay)
    pub fn get_state(&self) -> u64 {
        self.state
    }
}

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
