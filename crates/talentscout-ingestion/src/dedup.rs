//! Identity resolution: merge per-source records that describe the same person.
//!
//! Single-pass greedy clustering. Records are processed in input order and
//! compared against every identity created so far, in creation order; the
//! first identity whose name matches absorbs the record. A later, better
//! match is never considered.

use std::collections::{BTreeMap, HashMap};

use talentscout_common::{AnnotatedRecord, EngineConfig, Identity};
use tracing::{debug, info};

use crate::similarity::{is_duplicate, token_sort_ratio};

/// Result of matching one record against the current identity list.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// No identity matches; a new one is created.
    New,
    /// Case-insensitive name equality with identity `index`.
    Exact(usize),
    /// Token-sort similarity at or above the threshold.
    Fuzzy { index: usize, similarity: f64 },
}

/// Greedy identity resolver.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    threshold: f64,
    exact_index: bool,
}

impl IdentityResolver {
    /// Resolver with the given similarity threshold (0–100).
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            exact_index: false,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.fuzzy_threshold).with_exact_index(config.blocking_index)
    }

    /// Keep a lower-cased name → earliest identity index. The scan then stops
    /// at the indexed identity; results are unchanged.
    pub fn with_exact_index(mut self, enabled: bool) -> Self {
        self.exact_index = enabled;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Merge `records` into identities. Deterministic for a fixed input order.
    pub fn resolve(&self, records: &[AnnotatedRecord]) -> Vec<Identity> {
        let mut identities: Vec<Identity> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut merged = 0usize;
        let mut promoted = 0usize;

        for rec in records {
            let name = rec.record.display_name();
            let lookup = if self.exact_index {
                index.get(&name.to_lowercase()).copied()
            } else {
                None
            };

            match self.find_match(name, &identities, lookup) {
                MatchResult::New => {
                    let ident = new_identity(rec);
                    if self.exact_index {
                        index
                            .entry(ident.name.to_lowercase())
                            .or_insert(identities.len());
                    }
                    identities.push(ident);
                }
                MatchResult::Exact(i) | MatchResult::Fuzzy { index: i, .. } => {
                    debug!(
                        record = %name,
                        source = %rec.record.source,
                        identity = %identities[i].name,
                        "Merging record into existing identity"
                    );
                    merged += 1;
                    if absorb(&mut identities[i], rec) {
                        promoted += 1;
                    }
                }
            }
        }

        info!(
            records = records.len(),
            identities = identities.len(),
            merged,
            promoted,
            "Identity resolution complete"
        );
        identities
    }

    /// First identity, in creation order, that `name` duplicates.
    ///
    /// `exact_hint` is the earliest identity whose lower-cased name equals
    /// `name`, when known. Identities after it can never win, so the scan
    /// stops there.
    pub fn find_match(
        &self,
        name: &str,
        identities: &[Identity],
        exact_hint: Option<usize>,
    ) -> MatchResult {
        let limit = exact_hint.unwrap_or(identities.len()).min(identities.len());
        let lowered = name.to_lowercase();

        for (i, ident) in identities[..limit].iter().enumerate() {
            if ident.name.to_lowercase() == lowered {
                return MatchResult::Exact(i);
            }
            if is_duplicate(name, &ident.name, self.threshold) {
                return MatchResult::Fuzzy {
                    index: i,
                    similarity: token_sort_ratio(name, &ident.name),
                };
            }
        }

        match exact_hint {
            Some(i) if i < identities.len() => MatchResult::Exact(i),
            _ => MatchResult::New,
        }
    }
}

/// Identity initialised from a record that matched nothing.
pub fn new_identity(rec: &AnnotatedRecord) -> Identity {
    let r = &rec.record;
    let mut handles = BTreeMap::new();
    if !r.source.is_empty() && !r.handle.is_empty() {
        handles.insert(r.source.clone(), r.handle.clone());
    }
    Identity {
        name: r.display_name().to_string(),
        handles,
        rating: r.rating,
        source: r.source.clone(),
        rank: r.rank,
        country: r.country.clone(),
        first_seen: r.first_seen,
        stats: rec.stats,
        score_card: None,
    }
}

/// Merge `rec` into `ident`. A strictly higher rating promotes the record to
/// authoritative: rating, source and the record's statistics move onto the
/// identity. The handle map always gains the record's `source → handle`.
///
/// Returns whether the identity was promoted.
pub fn absorb(ident: &mut Identity, rec: &AnnotatedRecord) -> bool {
    let r = &rec.record;
    let promote = r.rating > ident.rating;
    if promote {
        ident.rating = r.rating;
        ident.source = r.source.clone();
        ident.rank = r.rank;
        ident.country = r.country.clone();
        ident.first_seen = r.first_seen;
        ident.stats = rec.stats;
    }
    if !r.source.is_empty() && !r.handle.is_empty() {
        ident.handles.insert(r.source.clone(), r.handle.clone());
    }
    promote
}

#[cfg(test)]
mod tests {
    use super::*;
    use talentscout_common::{RawRecord, RecordStats};

    fn ann(source: &str, handle: &str, name: &str, rating: f64) -> AnnotatedRecord {
        AnnotatedRecord::new(RawRecord::new(source, handle, rating).with_name(name))
    }

    #[test]
    fn test_distinct_names_stay_separate() {
        let records = vec![
            ann("codeforces", "a", "Alice", 1.0),
            ann("codeforces", "b", "Bob", 2.0),
        ];
        let out = IdentityResolver::new(88.0).resolve(&records);
        assert_eq!(out.len(), records.len());
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let records = vec![
            ann("codeforces", "tourist", "Gennady Korotkevich", 3800.0),
            ann("atcoder", "tourist", "gennady korotkevich", 3700.0),
        ];
        let out = IdentityResolver::new(88.0).resolve(&records);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].versatility(), 2);
        assert_eq!(out[0].name, "Gennady Korotkevich");
    }

    #[test]
    fn test_lower_rating_keeps_authoritative_source() {
        let mut ident = new_identity(&ann("codeforces", "al", "Alice", 1500.0));
        let promoted = absorb(&mut ident, &ann("kaggle", "aliceW", "Alice W.", 1200.0));
        assert!(!promoted);
        assert_eq!(ident.rating, 1500.0);
        assert_eq!(ident.source, "codeforces");
        assert_eq!(ident.handles.get("codeforces").map(String::as_str), Some("al"));
        assert_eq!(ident.handles.get("kaggle").map(String::as_str), Some("aliceW"));
        assert_eq!(ident.versatility(), 2);
    }

    #[test]
    fn test_higher_rating_promotes_stats() {
        let mut ident = new_identity(&ann("kaggle", "aw", "Alice", 12.0));
        let mut better = ann("codeforces", "al", "Alice", 1500.0);
        better.stats = RecordStats { norm: 0.9, rating_z: 1.2, ..Default::default() };
        assert!(absorb(&mut ident, &better));
        assert_eq!(ident.rating, 1500.0);
        assert_eq!(ident.source, "codeforces");
        assert_eq!(ident.stats.rating_z, 1.2);
        assert_eq!(ident.name, "Alice");
    }

    #[test]
    fn test_missing_handle_adds_no_entry() {
        let rec = AnnotatedRecord::new(RawRecord::new("kaggle", "", 5.0).with_name("Nobody"));
        let ident = new_identity(&rec);
        assert!(ident.handles.is_empty());
    }

    #[test]
    fn test_first_match_wins() {
        // "Jon Smith" is absorbed by "John Smith" (94.7) and, being higher
        // rated, promotes the identity's source.
        let records = vec![
            ann("codeforces", "a", "John Smith", 10.0),
            ann("atcoder", "b", "Jon Smith", 20.0),
        ];
        let out = IdentityResolver::new(88.0).resolve(&records);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "John Smith");
        assert_eq!(out[0].source, "atcoder");
    }

    #[test]
    fn test_exact_index_matches_plain_scan() {
        let records = vec![
            ann("codeforces", "a", "Jon Smith", 10.0),
            ann("codeforces", "b", "Maria Garcia", 20.0),
            ann("atcoder", "c", "John Smith", 30.0),
            ann("kaggle", "d", "maria garcia", 5.0),
            ann("leetcode", "e", "Jon Smyth", 7.0),
            ann("leetcode", "f", "Wei Zhang", 8.0),
        ];
        let plain = IdentityResolver::new(88.0).resolve(&records);
        let indexed = IdentityResolver::new(88.0)
            .with_exact_index(true)
            .resolve(&records);
        assert_eq!(plain, indexed);
    }

    #[test]
    fn test_find_match_reports_similarity() {
        let idents = vec![new_identity(&ann("codeforces", "p", "Petr Mitrichev", 1.0))];
        let res = IdentityResolver::new(88.0).find_match("Petr Mitrichv", &idents, None);
        match res {
            MatchResult::Fuzzy { index, similarity } => {
                assert_eq!(index, 0);
                assert!(similarity >= 88.0);
            }
            other => panic!("expected fuzzy match, got {other:?}"),
        }
    }

    #[test]
    fn test_from_config_takes_threshold() {
        let config = EngineConfig { fuzzy_threshold: 75.0, ..Default::default() };
        assert_eq!(IdentityResolver::from_config(&config).threshold(), 75.0);
    }
}
