//! Local first-seen dates per `(source, handle)`.
//!
//! Sources that report an account creation date seed the map with it; every
//! other handle is stamped with the day it was first observed locally.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use talentscout_common::{RawRecord, Result};
use tracing::{info, warn};

/// JSON-backed `source:handle → date` map.
#[derive(Debug, Clone)]
pub struct FirstSeenStore {
    path: PathBuf,
    entries: BTreeMap<String, NaiveDate>,
}

fn key(source: &str, handle: &str) -> String {
    format!("{source}:{handle}")
}

impl FirstSeenStore {
    /// Load from `path`; missing or unreadable files start empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Unreadable first-seen map, starting empty");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, source: &str, handle: &str) -> Option<NaiveDate> {
        self.entries.get(&key(source, handle)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record every handle and fill records lacking a `first_seen`.
    ///
    /// The stored date is the earliest of the platform-reported date and any
    /// date already on file; unseen handles without one get `today`. Records
    /// that carry their own date keep it. Returns the number of new handles.
    pub fn fill(&mut self, records: &mut [RawRecord], today: NaiveDate) -> usize {
        let mut added = 0;
        for rec in records.iter_mut() {
            if rec.handle.is_empty() {
                continue;
            }
            let k = key(&rec.source, &rec.handle);
            let candidate = rec.first_seen.unwrap_or(today);
            let stored = match self.entries.get(&k) {
                Some(&existing) => {
                    let earliest = existing.min(candidate);
                    self.entries.insert(k, earliest);
                    earliest
                }
                None => {
                    added += 1;
                    self.entries.insert(k, candidate);
                    candidate
                }
            };
            if rec.first_seen.is_none() {
                rec.first_seen = Some(stored);
            }
        }
        info!(added, total = self.entries.len(), "First-seen map updated");
        added
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}
