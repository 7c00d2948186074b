//! JSON catalog of raw ingestion output.
//!
//! Each source is fetched at most once per day; the catalog keeps the latest
//! payload per source with the date it was fetched, so repeated runs on the
//! same day reuse it. Layout:
//!
//! ```json
//! { "codeforces": { "fetched_at": "2026-10-19", "data": [ { "handle": "..", ... } ] } }
//! ```
//!
//! An unreadable catalog is treated as empty.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use talentscout_common::{RawRecord, Result};
use tracing::{debug, info, warn};

/// Env var that bypasses the cache when set to 1/true/yes.
pub const SKIP_CACHE_ENV: &str = "TALENTSCOUT_SKIP_CACHE";

/// One source's cached payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub fetched_at: NaiveDate,
    #[serde(default)]
    pub data: Vec<RawRecord>,
}

/// Raw record cache backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct RawCache {
    path: PathBuf,
    skip: bool,
}

impl RawCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            skip: false,
        }
    }

    /// Cache honouring `TALENTSCOUT_SKIP_CACHE`.
    pub fn from_env(path: impl Into<PathBuf>) -> Self {
        let skip = std::env::var(SKIP_CACHE_ENV)
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Self::new(path).with_skip(skip)
    }

    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached data for `source` if it was fetched on `today`.
    pub fn get_cached(&self, source: &str, today: NaiveDate) -> Option<Vec<RawRecord>> {
        if self.skip {
            return None;
        }
        let mut catalog = self.load_catalog();
        match catalog.remove(source) {
            Some(entry) if entry.fetched_at == today => {
                debug!(source, n = entry.data.len(), "Cache hit");
                Some(entry.data)
            }
            Some(entry) => {
                debug!(source, fetched_at = %entry.fetched_at, "Cache entry is stale");
                None
            }
            None => None,
        }
    }

    /// Latest cached entry for `source` regardless of age.
    pub fn get_latest(&self, source: &str) -> Option<CatalogEntry> {
        if self.skip {
            return None;
        }
        self.load_catalog().remove(source)
    }

    /// Persist `data` under `source` with `today`'s date.
    pub fn set_cached(&self, source: &str, today: NaiveDate, data: Vec<RawRecord>) -> Result<()> {
        if self.skip {
            return Ok(());
        }
        let mut catalog = self.load_catalog();
        let n = data.len();
        catalog.insert(
            source.to_string(),
            CatalogEntry {
                fetched_at: today,
                data,
            },
        );
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&catalog)?)?;
        info!(source, n, path = %self.path.display(), "Cached raw records");
        Ok(())
    }

    /// Sources present in the catalog.
    pub fn sources(&self) -> Vec<String> {
        self.load_catalog().into_keys().collect()
    }

    fn load_catalog(&self) -> BTreeMap<String, CatalogEntry> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_str(&content) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unreadable cache catalog, treating as empty");
                BTreeMap::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_fresh_entry_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RawCache::new(dir.path().join("catalog.json"));
        let data = vec![RawRecord::new("atcoder", "tourist", 3800.0).with_rank(1)];
        cache.set_cached("atcoder", day(19), data.clone()).unwrap();

        assert_eq!(cache.get_cached("atcoder", day(19)), Some(data));
        assert_eq!(cache.get_cached("atcoder", day(20)), None);
        assert_eq!(cache.get_latest("atcoder").map(|e| e.fetched_at), Some(day(19)));
        assert_eq!(cache.sources(), vec!["atcoder".to_string()]);
    }

    #[test]
    fn test_corrupt_catalog_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{not json").unwrap();
        let cache = RawCache::new(&path);
        assert!(cache.get_cached("codeforces", day(19)).is_none());
        assert!(cache.sources().is_empty());
    }

    #[test]
    fn test_skip_bypasses_reads_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let cache = RawCache::new(&path).with_skip(true);
        cache
            .set_cached("kaggle", day(19), vec![RawRecord::new("kaggle", "k", 3.0)])
            .unwrap();
        assert!(!path.exists());
        assert!(cache.get_cached("kaggle", day(19)).is_none());
    }
}
