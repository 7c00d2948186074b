//! Core record types flowing through the engine.
//!
//! `RawRecord` is what ingestion hands over, `AnnotatedRecord` adds the
//! statistics derived from the current batch, and `Identity` is one
//! deduplicated human aggregating handles across sources.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::score_card::ScoreCard;

// ---------------------------------------------------------------------------
// Raw record
// ---------------------------------------------------------------------------

/// One profile on one source, as emitted by an ingestion collaborator.
///
/// `(source, handle)` is the natural key. `name` is advisory and is what the
/// resolver fuzzy-matches on; sources without a separate display name repeat
/// the handle there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub name: String,
    pub handle: String,
    pub source: String,
    /// Source-specific scale; 0 when unrated.
    #[serde(default)]
    pub rating: f64,
    /// 1-based position within the source.
    #[serde(default)]
    pub rank: Option<u32>,
    /// Two-letter country code.
    #[serde(default)]
    pub country: Option<String>,
    /// Platform-reported account creation date.
    #[serde(default, alias = "platform_first_seen")]
    pub first_seen: Option<NaiveDate>,
}

impl RawRecord {
    /// Record whose display name is its handle.
    pub fn new(source: &str, handle: &str, rating: f64) -> Self {
        Self {
            name: handle.to_string(),
            handle: handle.to_string(),
            source: source.to_string(),
            rating,
            rank: None,
            country: None,
            first_seen: None,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn with_country(mut self, country: &str) -> Self {
        self.country = Some(country.to_string());
        self
    }

    pub fn with_first_seen(mut self, date: NaiveDate) -> Self {
        self.first_seen = Some(date);
        self
    }

    /// Name used for matching; falls back to the handle when blank.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.handle
        } else {
            &self.name
        }
    }

    /// Country code if present and non-blank.
    pub fn known_country(&self) -> Option<&str> {
        self.country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Derived statistics
// ---------------------------------------------------------------------------

/// Engine-computed fields. Pure functions of the current batch plus at most
/// one previous snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordStats {
    /// Percentile within the source (1.0 = best).
    pub norm: f64,
    /// Percentile within the (source, country) bucket; 0 when country unknown.
    pub geo_norm: f64,
    /// (rating − source mean) / source std.
    pub rating_z: f64,
    /// Rating change since the previous snapshot, in source std units.
    pub delta_sigma: f64,
    /// Population size of the record's source.
    pub total_in_src: usize,
}

/// A raw record together with its derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    pub record: RawRecord,
    pub stats: RecordStats,
}

impl AnnotatedRecord {
    pub fn new(record: RawRecord) -> Self {
        Self {
            record,
            stats: RecordStats::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// One resolved human.
///
/// `rating`, `source` and the fields after them describe the authoritative
/// record: the highest-rated record merged so far. `name` is the first-seen
/// display name and never changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    /// One handle per source.
    pub handles: BTreeMap<String, String>,
    pub rating: f64,
    pub source: String,
    pub rank: Option<u32>,
    pub country: Option<String>,
    pub first_seen: Option<NaiveDate>,
    pub stats: RecordStats,
    /// Populated by the scoring stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_card: Option<ScoreCard>,
}

impl Identity {
    /// Number of distinct sources this identity appears on.
    pub fn versatility(&self) -> usize {
        self.handles.len()
    }

    /// Final score, if scoring has run.
    pub fn score(&self) -> Option<f64> {
        self.score_card.as_ref().map(|c| c.total)
    }

    /// Reason clauses joined for display, if scoring has run.
    pub fn reason(&self) -> Option<String> {
        self.score_card.as_ref().map(|c| c.reason())
    }

    /// First handle found in `preference`, else the handle of the
    /// lexicographically first source.
    pub fn preferred_handle<S: AsRef<str>>(&self, preference: &[S]) -> Option<&str> {
        preference
            .iter()
            .find_map(|src| self.handles.get(src.as_ref()))
            .or_else(|| self.handles.values().next())
            .map(String::as_str)
    }

    /// Expand back into one raw record per handle, carrying the identity's
    /// name and authoritative rating.
    pub fn to_raw_records(&self) -> Vec<RawRecord> {
        self.handles
            .iter()
            .map(|(source, handle)| RawRecord {
                name: self.name.clone(),
                handle: handle.clone(),
                source: source.clone(),
                rating: self.rating,
                rank: None,
                country: self.country.clone(),
                first_seen: None,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_handle() {
        let rec = RawRecord::new("kaggle", "aliceW", 12.0).with_name("  ");
        assert_eq!(rec.display_name(), "aliceW");
        let rec = rec.with_name("Alice W.");
        assert_eq!(rec.display_name(), "Alice W.");
    }

    #[test]
    fn test_partial_record_deserialises() {
        let rec: RawRecord =
            serde_json::from_str(r#"{"handle": "tourist", "source": "codeforces"}"#).unwrap();
        assert_eq!(rec.rating, 0.0);
        assert!(rec.rank.is_none());
        assert!(rec.country.is_none());
        assert!(rec.first_seen.is_none());
        assert_eq!(rec.display_name(), "tourist");
    }

    #[test]
    fn test_platform_first_seen_alias() {
        let rec: RawRecord = serde_json::from_str(
            r#"{"name": "Bob", "handle": "bob", "source": "leetcode",
                "rating": 2100, "rank": 3, "platform_first_seen": "2021-04-02"}"#,
        )
        .unwrap();
        assert_eq!(rec.first_seen, NaiveDate::from_ymd_opt(2021, 4, 2));
        assert_eq!(rec.rank, Some(3));
    }

    #[test]
    fn test_blank_country_is_unknown() {
        let rec = RawRecord::new("codeforces", "x", 1.0).with_country(" ");
        assert!(rec.known_country().is_none());
    }

    #[test]
    fn test_preferred_handle_order() {
        let mut handles = BTreeMap::new();
        handles.insert("kaggle".to_string(), "k".to_string());
        handles.insert("atcoder".to_string(), "a".to_string());
        let ident = Identity {
            name: "X".into(),
            handles,
            rating: 1.0,
            source: "kaggle".into(),
            rank: None,
            country: None,
            first_seen: None,
            stats: RecordStats::default(),
            score_card: None,
        };
        assert_eq!(ident.preferred_handle(&["codeforces", "atcoder"]), Some("a"));
        assert_eq!(ident.preferred_handle(&["codeforces"]), Some("a"));
        assert_eq!(ident.versatility(), 2);
        assert_eq!(ident.to_raw_records().len(), 2);
    }
}
