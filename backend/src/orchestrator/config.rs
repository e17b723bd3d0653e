//! Scheduler configuration

use crate::arrivals::LoadDistribution;
use crate::core::time::SimDuration;
use crate::error_model::{InjectionPolicy, SitePolicy};
use crate::worker::ExecutionPolicy;
use serde::{Deserialize, Serialize};

use super::engine::SimulationError;

/// Default size of the worker pool
pub const DEFAULT_NUM_WORKERS: usize = 20;

/// Complete configuration of one scheduling run
///
/// Built with [`SchedulerConfig::new`] plus the `with_*` methods and checked
/// by [`SchedulerConfig::validate`] before any actor is spawned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Jobs generated by the dispatcher
    pub num_jobs: usize,

    pub num_workers: usize,

    /// Seed for every random draw in the run
    pub rng_seed: u64,

    /// Site (queue) whose historical error profile is used
    pub site: String,

    pub load_distribution: LoadDistribution,
    pub execution: ExecutionPolicy,
    pub injection: InjectionPolicy,
    pub site_policy: SitePolicy,

    /// Simulated gap between consecutive dispatcher sends
    pub dispatch_interval: SimDuration,
}

impl SchedulerConfig {
    pub fn new(num_jobs: usize, site: impl Into<String>) -> Self {
        Self {
            num_jobs,
            num_workers: DEFAULT_NUM_WORKERS,
            rng_seed: 0,
            site: site.into(),
            load_distribution: LoadDistribution::default(),
            execution: ExecutionPolicy::default(),
            injection: InjectionPolicy::default(),
            site_policy: SitePolicy::default(),
            dispatch_interval: SimDuration::ZERO,
        }
    }

    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    pub fn with_load_distribution(mut self, distribution: LoadDistribution) -> Self {
        self.load_distribution = distribution;
        self
    }

    pub fn with_execution(mut self, execution: ExecutionPolicy) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_injection(mut self, injection: InjectionPolicy) -> Self {
        self.injection = injection;
        self
    }

    pub fn with_site_policy(mut self, policy: SitePolicy) -> Self {
        self.site_policy = policy;
        self
    }

    pub fn with_dispatch_interval(mut self, interval: SimDuration) -> Self {
        self.dispatch_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.num_workers == 0 {
            return Err(SimulationError::InvalidConfig(
                "num_workers must be > 0".to_string(),
            ));
        }

        if self.site.trim().is_empty() {
            return Err(SimulationError::InvalidConfig(
                "site must not be empty".to_string(),
            ));
        }

        self.load_distribution
            .validate()
            .map_err(SimulationError::InvalidConfig)?;
        self.execution
            .validate()
            .map_err(SimulationError::InvalidConfig)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::new(10, "Q");
        assert_eq!(config.num_workers, 20);
        assert_eq!(config.injection, InjectionPolicy::Disabled);
        assert_eq!(config.site_policy, SitePolicy::Degrade);
        assert!(config.dispatch_interval.is_zero());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = SchedulerConfig::new(10, "Q").with_workers(0).validate();
        assert!(matches!(err, Err(SimulationError::InvalidConfig(_))));
    }

    #[test]
    fn test_blank_site_rejected() {
        let err = SchedulerConfig::new(10, "  ").validate();
        assert!(matches!(err, Err(SimulationError::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_distribution_rejected() {
        let err = SchedulerConfig::new(10, "Q")
            .with_load_distribution(LoadDistribution::Uniform { min: 5.0, max: 2.0 })
            .validate();
        assert!(matches!(err, Err(SimulationError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_jobs_allowed() {
        assert!(SchedulerConfig::new(0, "Q").validate().is_ok());
    }
}
