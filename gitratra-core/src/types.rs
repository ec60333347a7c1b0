//! Core domain types for gitratra
//!
//! The store is a nested mapping: repository name -> metric kind -> day ->
//! sample. Repository order is first-seen order so the persisted file stays
//! stable and diffable across runs; days are kept sorted (GitHub delivers
//! them ascending anyway).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================
// Samples
// ============================================

/// One day's worth of traffic for a single metric kind.
///
/// `uniques` counts distinct visitors/cloners and is always covered by
/// `count`; the merge engine asserts `count >= uniques` after every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Total events for the day
    pub count: u64,
    /// Distinct actors for the day
    pub uniques: u64,
}

impl MetricSample {
    pub fn new(count: u64, uniques: u64) -> Self {
        Self { count, uniques }
    }
}

/// A freshly fetched sample with the day it belongs to, as delivered by the
/// traffic API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyRecord {
    pub day: NaiveDate,
    pub count: u64,
    pub uniques: u64,
}

impl DailyRecord {
    pub fn sample(&self) -> MetricSample {
        MetricSample::new(self.count, self.uniques)
    }
}

/// Per-day samples for one repository and one metric kind.
pub type MetricData = BTreeMap<NaiveDate, MetricSample>;

// ============================================
// Metric kinds
// ============================================

/// The two traffic metrics GitHub reports per repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Clones,
    Views,
}

impl MetricKind {
    /// Returns the identifier used in the store file (`#clones` / `#views`)
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Clones => "clones",
            MetricKind::Views => "views",
        }
    }

    /// All kinds, in store-file emission order.
    pub const ALL: [MetricKind; 2] = [MetricKind::Clones, MetricKind::Views];
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clones" => Ok(MetricKind::Clones),
            "views" => Ok(MetricKind::Views),
            _ => Err(format!("unknown metric kind: {}", s)),
        }
    }
}

// ============================================
// Repository data
// ============================================

/// All recorded traffic for one repository, one map per metric kind.
///
/// Both kinds exist from the moment a repository is first seen; a kind with
/// no samples yet is simply an empty map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryData {
    pub clones: MetricData,
    pub views: MetricData,
}

impl RepositoryData {
    pub fn metric(&self, kind: MetricKind) -> &MetricData {
        match kind {
            MetricKind::Clones => &self.clones,
            MetricKind::Views => &self.views,
        }
    }

    pub fn metric_mut(&mut self, kind: MetricKind) -> &mut MetricData {
        match kind {
            MetricKind::Clones => &mut self.clones,
            MetricKind::Views => &mut self.views,
        }
    }
}

// ============================================
// Traffic data (the whole store)
// ============================================

/// The full in-memory store: repository name -> [`RepositoryData`],
/// iterated in first-seen order.
///
/// Owned by the run: read once from disk, mutated in memory, written back
/// once at the end. Lookups are linear; the tracked repository list is
/// small.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficData {
    repos: Vec<(String, RepositoryData)>,
}

impl TrafficData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&RepositoryData> {
        self.repos.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut RepositoryData> {
        self.repos
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    /// Returns the entry for `name`, creating an empty one (both metric
    /// kinds present, no samples) the first time the name is seen.
    pub fn ensure_repo(&mut self, name: &str) -> &mut RepositoryData {
        if let Some(idx) = self.repos.iter().position(|(n, _)| n == name) {
            return &mut self.repos[idx].1;
        }
        self.repos
            .push((name.to_string(), RepositoryData::default()));
        &mut self.repos.last_mut().expect("just pushed").1
    }

    /// Iterate repositories in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RepositoryData)> {
        self.repos.iter().map(|(n, d)| (n.as_str(), d))
    }
}
