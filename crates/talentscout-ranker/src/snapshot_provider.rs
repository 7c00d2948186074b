//! Trait for previous-day rating access.
//!
//! Lets the momentum stage query yesterday's ratings without depending on
//! how the ingestion side stores them.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use talentscout_common::{RawRecord, Result};
use talentscout_ingestion::snapshot::{RatingSnapshot, SnapshotStore};

/// Read access to exactly one prior snapshot.
///
/// Implementations can use:
/// - the on-disk daily snapshot store
/// - an in-memory `RatingSnapshot`
/// - mock data (testing)
pub trait SnapshotProvider: Send + Sync {
    /// Previous rating of `handle` on `source`; `None` for unseen handles.
    fn previous_rating(&self, source: &str, handle: &str) -> Option<f64>;

    /// Number of (source, handle) entries available.
    fn entry_count(&self) -> usize;
}

impl SnapshotProvider for RatingSnapshot {
    fn previous_rating(&self, source: &str, handle: &str) -> Option<f64> {
        self.get(source, handle)
    }

    fn entry_count(&self) -> usize {
        self.len()
    }
}

// ── Mock Implementation for Testing ────────────────────────────────────────

/// Mock provider with hardcoded ratings for unit tests.
pub struct MockSnapshotProvider {
    data: HashMap<(String, String), f64>,
}

impl MockSnapshotProvider {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Add a previous rating.
    pub fn with(mut self, source: &str, handle: &str, rating: f64) -> Self {
        self.data.insert((source.to_string(), handle.to_string()), rating);
        self
    }
}

impl Default for MockSnapshotProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotProvider for MockSnapshotProvider {
    fn previous_rating(&self, source: &str, handle: &str) -> Option<f64> {
        self.data
            .get(&(source.to_string(), handle.to_string()))
            .copied()
    }

    fn entry_count(&self) -> usize {
        self.data.len()
    }
}

// ── Adapter for SnapshotStore ───────────────────────────────────────────────

/// Adapter over the ingestion crate's [`SnapshotStore`] for one run day.
///
/// Loads the newest snapshot older than `today` once; a missing or corrupt
/// file leaves the adapter empty, which the momentum stage treats as "no
/// prior data".
pub struct SnapshotStoreAdapter {
    store: SnapshotStore,
    today: NaiveDate,
    previous: Option<RatingSnapshot>,
}

impl SnapshotStoreAdapter {
    pub fn load(store: SnapshotStore, today: NaiveDate) -> Self {
        let previous = store.load_previous(today);
        Self {
            store,
            today,
            previous,
        }
    }

    /// The loaded prior snapshot, if any.
    pub fn previous(&self) -> Option<&RatingSnapshot> {
        self.previous.as_ref()
    }

    /// Provider view, `None` when no prior snapshot exists.
    pub fn as_provider(&self) -> Option<&dyn SnapshotProvider> {
        self.previous.as_ref().map(|s| s as &dyn SnapshotProvider)
    }

    /// Persist today's ratings so tomorrow's run can compute momentum.
    pub fn save_today(&self, records: &[RawRecord]) -> Result<PathBuf> {
        let snapshot = RatingSnapshot::from_records(self.today, records);
        self.store.save(self.today, &snapshot)
    }
}

impl SnapshotProvider for SnapshotStoreAdapter {
    fn previous_rating(&self, source: &str, handle: &str) -> Option<f64> {
        self.previous.as_ref()?.get(source, handle)
    }

    fn entry_count(&self) -> usize {
        self.previous.as_ref().map_or(0, RatingSnapshot::len)
    }
}
