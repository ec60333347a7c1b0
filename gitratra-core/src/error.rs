//! Error types for gitratra-core

use thiserror::Error;

/// Main error type for the gitratra-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Store file format error (bad version tag or malformed line)
    #[error("store format error at line {line}: {message}")]
    Format { line: usize, message: String },

    /// A merged sample ended up with more uniques than total count
    #[error("invariant violation for {repo}/{kind} on {day}: uniques {uniques} > count {count}")]
    Invariant {
        repo: String,
        kind: String,
        day: chrono::NaiveDate,
        count: u64,
        uniques: u64,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// GitHub API error (non-2xx response or unexpected payload)
    #[error("GitHub API error: {0}")]
    Api(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for gitratra-core
pub type Result<T> = std::result::Result<T, Error>;
