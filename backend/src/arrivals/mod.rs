//! Job generation
//!
//! Produces the dispatcher's job stream. Identifiers follow the dispatch
//! sequence (`job0`, `job1`, ...) and loads are drawn from the configured
//! distribution using the dispatcher's RNG, so the same seed always yields
//! the same stream.
//!
//! # Example
//!
//! ```
//! use cluster_simulator_core_rs::arrivals::{JobGenerator, LoadDistribution};
//! use cluster_simulator_core_rs::rng::RngManager;
//!
//! let mut rng = RngManager::new(42);
//! let mut generator = JobGenerator::new(LoadDistribution::default());
//!
//! let job = generator.next_job(&mut rng);
//! assert_eq!(job.id().as_str(), "job0");
//! assert!(job.load() >= 1.0 && job.load() < 15.0);
//! ```

use crate::models::job::{Job, JobId};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};

/// Distribution of simulated job loads (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LoadDistribution {
    /// Uniform over [min, max)
    Uniform { min: f64, max: f64 },

    /// Every job carries the same load
    Fixed(f64),
}

impl Default for LoadDistribution {
    fn default() -> Self {
        LoadDistribution::Uniform {
            min: 1.0,
            max: 15.0,
        }
    }
}

impl LoadDistribution {
    /// Check that every possible load is positive and finite
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            LoadDistribution::Uniform { min, max } => {
                if !(min.is_finite() && max.is_finite()) {
                    return Err("load bounds must be finite".to_string());
                }
                if min <= 0.0 {
                    return Err(format!("minimum load must be > 0, got {}", min));
                }
                if min >= max {
                    return Err(format!("load range [{}, {}) is empty", min, max));
                }
                Ok(())
            }
            LoadDistribution::Fixed(load) => {
                if load.is_finite() && load > 0.0 {
                    Ok(())
                } else {
                    Err(format!("fixed load must be positive, got {}", load))
                }
            }
        }
    }

    pub fn sample(&self, rng: &mut RngManager) -> f64 {
        match *self {
            LoadDistribution::Uniform { min, max } => rng.uniform(min, max),
            LoadDistribution::Fixed(load) => load,
        }
    }
}

/// Sequential job factory
#[derive(Debug, Clone)]
pub struct JobGenerator {
    distribution: LoadDistribution,
    next_seq: usize,
}

impl JobGenerator {
    pub fn new(distribution: LoadDistribution) -> Self {
        Self {
            distribution,
            next_seq: 0,
        }
    }

    /// Number of jobs generated so far
    pub fn generated(&self) -> usize {
        self.next_seq
    }

    pub fn next_job(&mut self, rng: &mut RngManager) -> Job {
        let load = self.distribution.sample(rng);
        let job = Job::new(JobId::from_sequence(self.next_seq), load);
        self.next_seq += 1;
        job
    }
}
