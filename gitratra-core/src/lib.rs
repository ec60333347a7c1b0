//! # gitratra-core
//!
//! Core library for gitratra - a GitHub repository traffic tracker.
//!
//! GitHub only retains about two weeks of per-day clone and view counts, so
//! gitratra is run periodically (typically from cron) to fold the current
//! reporting window into a durable local store. This library provides:
//! - Domain types for the nested repository/metric/day structure
//! - The `gitratra_v1` text store codec
//! - The monotonic merge engine
//! - The GitHub traffic API client
//! - Configuration and logging infrastructure
//!
//! ## Run shape
//!
//! Load the store, fetch fresh records per configured repository, merge,
//! print a summary, persist. One owned [`TrafficData`] value flows through
//! all of it; the store file is rewritten exactly once at the end, and only
//! if every repository succeeded.

// Re-export commonly used items at the crate root
pub use config::Config;
pub use credential::Credential;
pub use error::{Error, Result};
pub use github::TrafficClient;
pub use types::{DailyRecord, MetricData, MetricKind, MetricSample, RepositoryData, TrafficData};

// Public modules
pub mod config;
pub mod credential;
pub mod error;
pub mod github;
pub mod logging;
pub mod merge;
pub mod repolist;
pub mod store;
pub mod summary;
pub mod types;
