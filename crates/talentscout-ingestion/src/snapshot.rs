//! Daily rating snapshots.
//!
//! One JSON file per day, `<dir>/<YYYY-MM-DD>.json`, mapping
//! `source → handle → rating`. Momentum compares today's batch against the
//! newest snapshot strictly older than today. A missing or unreadable
//! snapshot means "no prior data", never an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use talentscout_common::{RawRecord, Result};
use tracing::{debug, info, warn};

/// Ratings observed on one day.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingSnapshot {
    pub taken_on: Option<NaiveDate>,
    ratings: BTreeMap<String, BTreeMap<String, f64>>,
}

impl RatingSnapshot {
    pub fn new(taken_on: NaiveDate) -> Self {
        Self {
            taken_on: Some(taken_on),
            ratings: BTreeMap::new(),
        }
    }

    /// Snapshot of every record's current rating.
    pub fn from_records(taken_on: NaiveDate, records: &[RawRecord]) -> Self {
        let mut snap = Self::new(taken_on);
        for rec in records {
            snap.insert(&rec.source, &rec.handle, rec.rating);
        }
        snap
    }

    pub fn insert(&mut self, source: &str, handle: &str, rating: f64) {
        self.ratings
            .entry(source.to_string())
            .or_default()
            .insert(handle.to_string(), rating);
    }

    /// Previous rating of `handle` on `source`.
    pub fn get(&self, source: &str, handle: &str) -> Option<f64> {
        self.ratings.get(source)?.get(handle).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.values().all(BTreeMap::is_empty)
    }

    /// Number of (source, handle) entries.
    pub fn len(&self) -> usize {
        self.ratings.values().map(BTreeMap::len).sum()
    }
}

/// Directory of daily snapshot files.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, day: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", day.format("%Y-%m-%d")))
    }

    /// Newest snapshot dated strictly before `today`, if one is readable.
    pub fn load_previous(&self, today: NaiveDate) -> Option<RatingSnapshot> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) => {
                debug!(dir = %self.dir.display(), error = %e, "No snapshot directory");
                return None;
            }
        };

        let previous = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?;
                NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
            })
            .filter(|day| *day < today)
            .max()?;

        self.load(previous)
    }

    /// Snapshot for exactly `day`, if present and readable.
    pub fn load(&self, day: NaiveDate) -> Option<RatingSnapshot> {
        let path = self.path_for(day);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<BTreeMap<String, BTreeMap<String, f64>>>(&content) {
            Ok(ratings) => {
                let snap = RatingSnapshot {
                    taken_on: Some(day),
                    ratings,
                };
                info!(day = %day, entries = snap.len(), "Loaded previous rating snapshot");
                Some(snap)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt rating snapshot, ignoring");
                None
            }
        }
    }

    /// Write `snapshot` under its date, replacing any existing file.
    pub fn save(&self, day: NaiveDate, snapshot: &RatingSnapshot) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(day);
        std::fs::write(&path, serde_json::to_string_pretty(&snapshot.ratings)?)?;
        info!(path = %path.display(), entries = snapshot.len(), "Saved rating snapshot");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_load_previous_picks_newest_older_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        let mut a = RatingSnapshot::new(day(15));
        a.insert("codeforces", "tourist", 3700.0);
        let mut b = RatingSnapshot::new(day(18));
        b.insert("codeforces", "tourist", 3750.0);
        let mut c = RatingSnapshot::new(day(19));
        c.insert("codeforces", "tourist", 3800.0);
        store.save(day(15), &a).unwrap();
        store.save(day(18), &b).unwrap();
        store.save(day(19), &c).unwrap();

        let prev = store.load_previous(day(19)).unwrap();
        assert_eq!(prev.taken_on, Some(day(18)));
        assert_eq!(prev.get("codeforces", "tourist"), Some(3750.0));
        assert_eq!(prev.get("codeforces", "petr"), None);
    }

    #[test]
    fn test_missing_directory_is_no_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("absent"));
        assert!(store.load_previous(day(19)).is_none());
    }

    #[test]
    fn test_corrupt_snapshot_is_no_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2026-10-18.json"), "[1, 2, 3]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(store.load_previous(day(19)).is_none());
    }

    #[test]
    fn test_from_records() {
        let records = vec![
            RawRecord::new("atcoder", "a", 2000.0),
            RawRecord::new("kaggle", "k", 14.0),
        ];
        let snap = RatingSnapshot::from_records(day(19), &records);
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.get("kaggle", "k"), Some(14.0));
        assert!(!snap.is_empty());
    }
}
