//! Store codec: the `gitratra_v1` line-oriented text format
//!
//! Grammar:
//!
//! ```text
//! file   := "gitratra_v1" NEWLINE repo*
//! repo   := ">" NAME NEWLINE metric*
//! metric := "#" KIND NEWLINE sample*
//! sample := DATE " " COUNT " " UNIQUES NEWLINE
//! ```
//!
//! This format is the compatibility contract with files already on disk:
//! encoding is bit-exact, and decoding rejects anything that does not match
//! the grammar. The only non-error deviation is a missing file, which reads
//! as an empty store (first-run bootstrap).

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{MetricKind, MetricSample, TrafficData};

/// Version tag on the first line of every store file.
pub const FORMAT_TAG: &str = "gitratra_v1";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Encode the store into its textual form.
///
/// Repositories are emitted in first-seen order, metric kinds in the fixed
/// clones-then-views order, days ascending.
pub fn encode(store: &TrafficData) -> String {
    let mut out = String::new();
    out.push_str(FORMAT_TAG);
    out.push('\n');
    for (name, repo) in store.iter() {
        out.push('>');
        out.push_str(name);
        out.push('\n');
        for kind in MetricKind::ALL {
            out.push('#');
            out.push_str(kind.as_str());
            out.push('\n');
            for (day, sample) in repo.metric(kind) {
                out.push_str(&format!(
                    "{} {} {}\n",
                    day.format(DATE_FORMAT),
                    sample.count,
                    sample.uniques
                ));
            }
        }
    }
    out
}

/// Decode a store file's contents.
///
/// Any line that does not fit the grammar is a fatal [`Error::Format`]
/// carrying its 1-based line number; no partial-record recovery is
/// attempted. A `#kind` header with no sample lines under it is valid and
/// yields an empty metric map.
pub fn decode(input: &str) -> Result<TrafficData> {
    let mut lines = input.lines().enumerate();

    match lines.next() {
        Some((_, first)) if first == FORMAT_TAG => {}
        Some((_, first)) => {
            return Err(Error::Format {
                line: 1,
                message: format!("bad version tag {:?}, expected {:?}", first, FORMAT_TAG),
            });
        }
        None => {
            return Err(Error::Format {
                line: 1,
                message: "empty store file, expected version tag".to_string(),
            });
        }
    }

    let mut store = TrafficData::new();
    let mut current_repo: Option<String> = None;
    let mut current_kind: Option<MetricKind> = None;

    for (idx, line) in lines {
        let lineno = idx + 1;

        if let Some(name) = line.strip_prefix('>') {
            store.ensure_repo(name);
            current_repo = Some(name.to_string());
            current_kind = None;
        } else if let Some(kind_str) = line.strip_prefix('#') {
            if current_repo.is_none() {
                return Err(Error::Format {
                    line: lineno,
                    message: "metric header before any repository line".to_string(),
                });
            }
            let kind = MetricKind::from_str(kind_str).map_err(|e| Error::Format {
                line: lineno,
                message: e,
            })?;
            current_kind = Some(kind);
        } else {
            let (repo, kind) = match (&current_repo, current_kind) {
                (Some(repo), Some(kind)) => (repo, kind),
                _ => {
                    return Err(Error::Format {
                        line: lineno,
                        message: format!("sample line {:?} outside a metric block", line),
                    });
                }
            };
            let (day, sample) = parse_sample(line, lineno)?;
            store
                .get_mut(repo)
                .expect("repo inserted when its header was read")
                .metric_mut(kind)
                .insert(day, sample);
        }
    }

    Ok(store)
}

/// Parse one `DATE COUNT UNIQUES` line.
fn parse_sample(line: &str, lineno: usize) -> Result<(NaiveDate, MetricSample)> {
    let malformed = |message: String| Error::Format {
        line: lineno,
        message,
    };

    let mut fields = line.split(' ');
    let (date_str, count_str, uniques_str) =
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(d), Some(c), Some(u), None) => (d, c, u),
            _ => {
                return Err(malformed(format!(
                    "expected \"DATE COUNT UNIQUES\", got {:?}",
                    line
                )));
            }
        };

    let day = NaiveDate::parse_from_str(date_str, DATE_FORMAT)
        .map_err(|e| malformed(format!("bad date {:?}: {}", date_str, e)))?;
    let count: u64 = count_str
        .parse()
        .map_err(|e| malformed(format!("bad count {:?}: {}", count_str, e)))?;
    let uniques: u64 = uniques_str
        .parse()
        .map_err(|e| malformed(format!("bad uniques {:?}: {}", uniques_str, e)))?;

    Ok((day, MetricSample::new(count, uniques)))
}

/// Load the store from `path`.
///
/// A missing file is the bootstrap condition and yields an empty store; any
/// other IO or format failure is fatal.
pub fn load(path: &Path) -> Result<TrafficData> {
    if !path.exists() {
        info!(path = %path.display(), "No store file found, starting with an empty store");
        return Ok(TrafficData::new());
    }
    let content = std::fs::read_to_string(path)?;
    let store = decode(&content)?;
    debug!(path = %path.display(), repos = store.len(), "Loaded store");
    Ok(store)
}

/// Persist the store to `path`.
///
/// The encoded text is written to a sibling temp file and renamed into
/// place, so a crash mid-write cannot leave a torn store behind.
pub fn save(path: &Path, store: &TrafficData) -> Result<()> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, encode(store))?;
    std::fs::rename(&tmp, path)?;
    info!(path = %path.display(), repos = store.len(), "Saved store");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_store() -> TrafficData {
        let mut store = TrafficData::new();
        let repo = store.ensure_repo("gitratra");
        repo.clones.insert(day(2024, 1, 1), MetricSample::new(10, 4));
        repo.clones.insert(day(2024, 1, 2), MetricSample::new(3, 3));
        repo.views.insert(day(2024, 1, 1), MetricSample::new(25, 7));
        store.ensure_repo("generax");
        store
    }

    #[test]
    fn encode_emits_grammar() {
        let encoded = encode(&sample_store());
        assert_eq!(
            encoded,
            "gitratra_v1\n\
             >gitratra\n\
             #clones\n\
             2024-01-01 10 4\n\
             2024-01-02 3 3\n\
             #views\n\
             2024-01-01 25 7\n\
             >generax\n\
             #clones\n\
             #views\n"
        );
    }

    #[test]
    fn round_trip_preserves_everything() {
        let store = sample_store();
        let decoded = decode(&encode(&store)).unwrap();
        assert_eq!(decoded, store);
    }

    #[test]
    fn decode_rejects_bad_version_tag() {
        let err = decode("gitratra_v2\n>x\n").unwrap_err();
        match err {
            Error::Format { line: 1, .. } => {}
            other => panic!("expected format error on line 1, got {:?}", other),
        }
    }

    #[test]
    fn decode_rejects_empty_input() {
        assert!(decode("").is_err());
    }

    #[test]
    fn decode_accepts_empty_metric_block() {
        // A `#kind` header followed directly by another header is a valid
        // empty metric map, not an error.
        let store = decode("gitratra_v1\n>x\n#clones\n#views\n2024-01-01 5 2\n").unwrap();
        let repo = store.get("x").unwrap();
        assert!(repo.clones.is_empty());
        assert_eq!(
            repo.views.get(&day(2024, 1, 1)),
            Some(&MetricSample::new(5, 2))
        );
    }

    #[test]
    fn decode_accepts_repo_with_no_metrics() {
        let store = decode("gitratra_v1\n>lonely\n").unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("lonely").unwrap().clones.is_empty());
    }

    #[test]
    fn decode_rejects_unknown_metric_kind() {
        let err = decode("gitratra_v1\n>x\n#downloads\n").unwrap_err();
        match err {
            Error::Format { line: 3, .. } => {}
            other => panic!("expected format error on line 3, got {:?}", other),
        }
    }

    #[test]
    fn decode_rejects_malformed_sample_lines() {
        for bad in [
            "gitratra_v1\n>x\n#clones\n2024-01-01 10\n",
            "gitratra_v1\n>x\n#clones\n2024-01-01 10 4 9\n",
            "gitratra_v1\n>x\n#clones\nnot-a-date 10 4\n",
            "gitratra_v1\n>x\n#clones\n2024-01-01 ten 4\n",
            "gitratra_v1\n>x\n#clones\n2024-01-01 10 -4\n",
        ] {
            assert!(decode(bad).is_err(), "should reject {:?}", bad);
        }
    }

    #[test]
    fn decode_rejects_sample_outside_metric_block() {
        assert!(decode("gitratra_v1\n>x\n2024-01-01 10 4\n").is_err());
        assert!(decode("gitratra_v1\n2024-01-01 10 4\n").is_err());
        assert!(decode("gitratra_v1\n#clones\n").is_err());
    }

    #[test]
    fn load_missing_file_bootstraps_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = load(&dir.path().join("absent.txt")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traffic.txt");
        let store = sample_store();
        save(&path, &store).unwrap();
        assert_eq!(load(&path).unwrap(), store);
        // No temp file left behind
        assert!(!path.with_extension("tmp").exists());
    }
}
