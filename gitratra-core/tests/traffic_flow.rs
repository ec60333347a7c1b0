//! End-to-end tests for the load -> merge -> save flow
//!
//! These exercise the store codec and merge engine together the way a run
//! uses them, including compatibility with a handwritten `gitratra_v1` file.

use chrono::NaiveDate;
use tempfile::TempDir;

use gitratra_core::types::{DailyRecord, MetricSample, TrafficData};
use gitratra_core::{merge, store};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(date: NaiveDate, count: u64, uniques: u64) -> DailyRecord {
    DailyRecord {
        day: date,
        count,
        uniques,
    }
}

#[test]
fn first_run_bootstraps_merges_and_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traffic.txt");

    // Missing file reads as an empty store
    let mut traffic = store::load(&path).unwrap();
    assert!(traffic.is_empty());

    // Fresh fetch for repo X: one clone day
    merge::update_repository(&mut traffic, "X", &[record(day(2024, 1, 1), 10, 4)], &[]).unwrap();
    store::save(&path, &traffic).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "gitratra_v1\n>X\n#clones\n2024-01-01 10 4\n#views\n");
}

#[test]
fn second_run_merges_against_persisted_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traffic.txt");

    let mut traffic = TrafficData::new();
    merge::update_repository(&mut traffic, "X", &[record(day(2024, 1, 1), 10, 4)], &[]).unwrap();
    store::save(&path, &traffic).unwrap();

    // Next run: the same day comes back with a lower count but higher
    // uniques (time-of-day artifact); merged per-field max is (10, 6).
    let mut traffic = store::load(&path).unwrap();
    merge::update_repository(&mut traffic, "X", &[record(day(2024, 1, 1), 7, 6)], &[]).unwrap();
    store::save(&path, &traffic).unwrap();

    let traffic = store::load(&path).unwrap();
    assert_eq!(
        traffic.get("X").unwrap().clones.get(&day(2024, 1, 1)),
        Some(&MetricSample::new(10, 6))
    );
}

#[test]
fn reads_handwritten_legacy_file() {
    // A file produced by an earlier deployment must keep loading as-is.
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traffic.txt");
    std::fs::write(
        &path,
        "gitratra_v1\n\
         >gitratra\n\
         #clones\n\
         2023-12-30 2 1\n\
         2023-12-31 5 5\n\
         #views\n\
         2023-12-30 40 11\n\
         >generax\n\
         #clones\n\
         #views\n",
    )
    .unwrap();

    let traffic = store::load(&path).unwrap();
    assert_eq!(traffic.len(), 2);
    let repo = traffic.get("gitratra").unwrap();
    assert_eq!(repo.clones.len(), 2);
    assert_eq!(
        repo.views.get(&day(2023, 12, 30)),
        Some(&MetricSample::new(40, 11))
    );
    assert!(traffic.get("generax").unwrap().clones.is_empty());

    // And re-encoding it reproduces the file byte for byte.
    assert_eq!(store::encode(&traffic), std::fs::read_to_string(&path).unwrap());
}

#[test]
fn repositories_keep_first_seen_order_across_runs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traffic.txt");

    let mut traffic = TrafficData::new();
    merge::update_repository(&mut traffic, "b", &[record(day(2024, 1, 1), 1, 1)], &[]).unwrap();
    merge::update_repository(&mut traffic, "a", &[record(day(2024, 1, 1), 2, 2)], &[]).unwrap();
    store::save(&path, &traffic).unwrap();

    // A later run that processes the list in a different order must not
    // reshuffle the file.
    let mut traffic = store::load(&path).unwrap();
    merge::update_repository(&mut traffic, "a", &[record(day(2024, 1, 2), 3, 3)], &[]).unwrap();
    merge::update_repository(&mut traffic, "b", &[], &[]).unwrap();
    store::save(&path, &traffic).unwrap();

    let names: Vec<String> = store::load(&path)
        .unwrap()
        .iter()
        .map(|(n, _)| n.to_string())
        .collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[test]
fn corrupt_store_aborts_the_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("traffic.txt");

    std::fs::write(&path, "some other format\n>X\n").unwrap();
    assert!(store::load(&path).is_err());

    std::fs::write(&path, "gitratra_v1\n>X\n#clones\n2024-01-01 broken 4\n").unwrap();
    assert!(store::load(&path).is_err());
}
