//! Historical error frequency table
//!
//! Input format is a JSON object keyed by site (queue) name; each value maps
//! an error-code label to the number of times it was observed:
//!
//! ```json
//! {
//!   "SITE_A": { "1": 12, "137": 3 },
//!   "SITE_B": {}
//! }
//! ```
//!
//! Counts are unsigned integers; negative or fractional counts are rejected
//! when parsing. The table is immutable once loaded.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Code label → observed occurrence count for one site
pub type SiteFrequencies = BTreeMap<String, u64>;

/// Errors raised while loading a frequency table
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse error frequency table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-site historical error frequencies
///
/// # Example
/// ```
/// use cluster_simulator_core_rs::ErrorFrequencyTable;
///
/// let table = ErrorFrequencyTable::from_json_str(r#"{"SITE_A": {"1": 3, "2": 1}}"#).unwrap();
/// assert!(table.contains_site("SITE_A"));
/// assert_eq!(table.total_weight("SITE_A"), Some(4));
/// assert_eq!(table.total_weight("SITE_B"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorFrequencyTable {
    sites: BTreeMap<String, SiteFrequencies>,
}

impl ErrorFrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, TableError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a table from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Builder used by tests and embedders that construct tables in code
    pub fn with_site<I, K>(mut self, site: impl Into<String>, codes: I) -> Self
    where
        I: IntoIterator<Item = (K, u64)>,
        K: Into<String>,
    {
        let entry = self.sites.entry(site.into()).or_default();
        for (code, count) in codes {
            entry.insert(code.into(), count);
        }
        self
    }

    pub fn site(&self, site: &str) -> Option<&SiteFrequencies> {
        self.sites.get(site)
    }

    pub fn contains_site(&self, site: &str) -> bool {
        self.sites.contains_key(site)
    }

    pub fn sites(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }

    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    /// Sum of all counts recorded for `site`, `None` if the site is absent
    pub fn total_weight(&self, site: &str) -> Option<u64> {
        self.sites.get(site).map(|codes| codes.values().sum())
    }
}
