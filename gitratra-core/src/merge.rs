//! Merge engine: reconcile freshly fetched daily records with the store
//!
//! GitHub's most recent day in its reporting window can report a transiently
//! lower figure depending on the time of day the query runs, so the merge is
//! monotonic: a stored value never decreases. The max is taken per field
//! (count and uniques independently), matching the historical behavior of
//! the store even though the result can pair fields from two different
//! fetches.

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{DailyRecord, MetricData, MetricKind, TrafficData};

/// Merge a batch of fresh records into one metric map.
///
/// Absent days are inserted as-is; present days resolve to the per-field
/// max. After resolution every touched sample must satisfy
/// `count >= uniques`; a violation aborts the run (it signals corrupted
/// input or a merge bug and is never silently corrected).
pub fn merge_samples(
    existing: &mut MetricData,
    fresh: &[DailyRecord],
    repo: &str,
    kind: MetricKind,
) -> Result<()> {
    for record in fresh {
        let merged = match existing.get(&record.day) {
            Some(prev) => {
                let mut merged = *prev;
                merged.count = merged.count.max(record.count);
                merged.uniques = merged.uniques.max(record.uniques);
                merged
            }
            None => record.sample(),
        };
        if merged.count < merged.uniques {
            return Err(Error::Invariant {
                repo: repo.to_string(),
                kind: kind.as_str().to_string(),
                day: record.day,
                count: merged.count,
                uniques: merged.uniques,
            });
        }
        existing.insert(record.day, merged);
    }
    Ok(())
}

/// Merge one repository's freshly fetched clones and views into the store.
///
/// Creates the repository entry on first sight (both metric kinds present,
/// empty). The two kinds are merged independently.
pub fn update_repository(
    store: &mut TrafficData,
    name: &str,
    clones: &[DailyRecord],
    views: &[DailyRecord],
) -> Result<()> {
    let repo = store.ensure_repo(name);
    merge_samples(&mut repo.clones, clones, name, MetricKind::Clones)?;
    merge_samples(&mut repo.views, views, name, MetricKind::Views)?;
    debug!(
        repo = name,
        clone_days = repo.clones.len(),
        view_days = repo.views.len(),
        "Merged fresh traffic"
    );
    Ok(())
}
