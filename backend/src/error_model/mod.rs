//! Historical error model
//!
//! Turns one site's error frequency table into a weighted discrete
//! distribution. Each draw returns either `Success` or an error code with
//! probability proportional to its weight:
//!
//! ```text
//! P(code)    = count(code)    / (success_weight + Σ counts)
//! P(Success) = success_weight / (success_weight + Σ counts)
//! ```
//!
//! The model is immutable after construction and is shared between workers
//! behind an `Arc`; every worker draws with its own [`RngManager`].

mod table;

pub use table::{ErrorFrequencyTable, SiteFrequencies, TableError};

use crate::models::job::{ErrorCode, JobOutcome};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// What to do when the requested site is missing from the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SitePolicy {
    /// Warn and run without error injection
    #[default]
    Degrade,

    /// Treat the missing site as a configuration error
    Strict,
}

/// When (if ever) workers consult the error model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InjectionPolicy {
    /// Only the execution ceiling can fail a job
    #[default]
    Disabled,

    /// One draw per job that finishes under the ceiling; a drawn code
    /// replaces the success
    OnCompletion {
        /// Weight of the `Success` outcome next to the historical counts
        success_weight: u64,
    },
}

impl InjectionPolicy {
    pub fn is_enabled(&self) -> bool {
        matches!(self, InjectionPolicy::OnCompletion { .. })
    }

    pub fn success_weight(&self) -> u64 {
        match self {
            InjectionPolicy::Disabled => 0,
            InjectionPolicy::OnCompletion { success_weight } => *success_weight,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ErrorModelError {
    #[error("Site not found: {0}")]
    SiteNotFound(String),
}

/// Result of one draw from the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sample {
    Success,
    Error(ErrorCode),
}

impl From<Sample> for JobOutcome {
    fn from(sample: Sample) -> Self {
        match sample {
            Sample::Success => JobOutcome::Success,
            Sample::Error(code) => JobOutcome::Error(code),
        }
    }
}

/// Weighted sampler over one site's historical outcomes
///
/// # Example
/// ```
/// use cluster_simulator_core_rs::{ErrorFrequencyTable, ErrorModel, RngManager, SitePolicy};
/// use cluster_simulator_core_rs::error_model::Sample;
///
/// let table = ErrorFrequencyTable::new().with_site("SITE", [("137", 1)]);
/// let model = ErrorModel::for_site(&table, "SITE", 0, SitePolicy::Degrade).unwrap();
///
/// let mut rng = RngManager::new(1);
/// assert!(matches!(model.sample(&mut rng), Sample::Error(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorModel {
    site: String,

    /// Outcomes with non-zero weight, success first, then codes by label
    outcomes: Vec<Sample>,

    /// Running weight totals, parallel to `outcomes`
    cumulative: Vec<u64>,

    total_weight: u64,
    success_weight: u64,
    site_found: bool,
}

impl ErrorModel {
    /// Build the sampler for `site`
    ///
    /// A missing site either degrades to a model that only returns
    /// `Success` (with a warning) or fails, depending on `policy`.
    pub fn for_site(
        table: &ErrorFrequencyTable,
        site: &str,
        success_weight: u64,
        policy: SitePolicy,
    ) -> Result<Self, ErrorModelError> {
        let frequencies = match table.site(site) {
            Some(f) => f,
            None => {
                if policy == SitePolicy::Strict {
                    return Err(ErrorModelError::SiteNotFound(site.to_string()));
                }
                warn!(site, "Site not found in error table; error injection disabled");
                return Ok(Self::success_only(site));
            }
        };

        let mut outcomes = Vec::with_capacity(frequencies.len() + 1);
        let mut cumulative = Vec::with_capacity(frequencies.len() + 1);
        let mut running = 0u64;

        if success_weight > 0 {
            running += success_weight;
            outcomes.push(Sample::Success);
            cumulative.push(running);
        }
        for (label, &count) in frequencies {
            // Zero-weight codes can never be drawn
            if count == 0 {
                continue;
            }
            running = running.saturating_add(count);
            outcomes.push(Sample::Error(ErrorCode::historical(label.clone())));
            cumulative.push(running);
        }

        if running == success_weight {
            warn!(site, "Site has no recorded error weight; no errors will be injected");
        }

        Ok(Self {
            site: site.to_string(),
            outcomes,
            cumulative,
            total_weight: running,
            success_weight,
            site_found: true,
        })
    }

    /// A model that never produces an error
    pub fn success_only(site: &str) -> Self {
        Self {
            site: site.to_string(),
            outcomes: Vec::new(),
            cumulative: Vec::new(),
            total_weight: 0,
            success_weight: 0,
            site_found: false,
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    /// Whether the site was present in the table
    pub fn site_found(&self) -> bool {
        self.site_found
    }

    /// Total weight across success and error outcomes
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Weight carried by error codes alone
    pub fn error_weight(&self) -> u64 {
        self.total_weight - self.success_weight
    }

    /// True when no outcome carries any weight
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    /// True when no draw can ever return an error
    pub fn never_fails(&self) -> bool {
        self.error_weight() == 0
    }

    /// Weight of a historical code, zero when the code is unknown
    pub fn weight_of(&self, label: &str) -> u64 {
        self.outcomes
            .iter()
            .enumerate()
            .find_map(|(idx, outcome)| match outcome {
                Sample::Error(ErrorCode::Historical(l)) if l == label => Some(idx),
                _ => None,
            })
            .map(|idx| self.entry_weight(idx))
            .unwrap_or(0)
    }

    /// Probability that a single draw returns `label`
    pub fn probability_of(&self, label: &str) -> f64 {
        if self.total_weight == 0 {
            return 0.0;
        }
        self.weight_of(label) as f64 / self.total_weight as f64
    }

    /// Codes that can be drawn, in sampling order
    pub fn codes(&self) -> impl Iterator<Item = &ErrorCode> {
        self.outcomes.iter().filter_map(|o| match o {
            Sample::Error(code) => Some(code),
            Sample::Success => None,
        })
    }

    /// Draw one outcome
    pub fn sample(&self, rng: &mut RngManager) -> Sample {
        if self.total_weight == 0 {
            return Sample::Success;
        }

        let target = ((rng.next_f64() * self.total_weight as f64) as u64).min(self.total_weight - 1);
        let idx = self.cumulative.partition_point(|&c| c <= target);
        self.outcomes[idx].clone()
    }

    fn entry_weight(&self, idx: usize) -> u64 {
        let previous = if idx == 0 { 0 } else { self.cumulative[idx - 1] };
        self.cumulative[idx] - previous
    }
}
