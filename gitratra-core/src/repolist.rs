//! Repository list loader
//!
//! One repository name per line; surrounding whitespace is trimmed and
//! blank lines are skipped. Line order defines fetch order.

use std::path::Path;

use crate::error::{Error, Result};

/// Read the ordered list of repository names from `path`.
pub fn load(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "failed to read repository list {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
