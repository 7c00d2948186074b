//! Per-source normalisation: percentile, geo percentile and z-score.
//!
//! Every statistic is a pure function of the whole per-source population in
//! the current batch, so record order never changes the result.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use talentscout_common::{AnnotatedRecord, RawRecord, RecordStats};
use tracing::debug;

use crate::stats::{is_constant, mean, percentiles, population_std};

/// Aggregates of one source's ratings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceStats {
    pub count: usize,
    pub mean: f64,
    /// Population std; 1.0 when the source has no spread.
    pub std: f64,
}

/// Output of [`Normalizer::normalise`]: annotated records in input order plus
/// the per-source aggregates later stages need.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalisedBatch {
    records: Vec<AnnotatedRecord>,
    stats: BTreeMap<String, SourceStats>,
}

impl NormalisedBatch {
    pub fn records(&self) -> &[AnnotatedRecord] {
        &self.records
    }

    pub fn source_stats(&self, source: &str) -> Option<&SourceStats> {
        self.stats.get(source)
    }

    pub fn stats(&self) -> &BTreeMap<String, SourceStats> {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn into_parts(self) -> (Vec<AnnotatedRecord>, BTreeMap<String, SourceStats>) {
        (self.records, self.stats)
    }
}

/// First pipeline stage.
#[derive(Debug, Clone, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Annotate every record with `norm`, `geo_norm`, `rating_z` and
    /// `total_in_src`. `delta_sigma` is left at 0 for the momentum stage.
    pub fn normalise(&self, records: Vec<RawRecord>) -> NormalisedBatch {
        let mut by_source: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut by_country: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
        for (i, rec) in records.iter().enumerate() {
            by_source.entry(rec.source.clone()).or_default().push(i);
            if let Some(country) = rec.known_country() {
                by_country
                    .entry((rec.source.clone(), country.to_string()))
                    .or_default()
                    .push(i);
            }
        }

        let mut annotated: Vec<RecordStats> = vec![RecordStats::default(); records.len()];
        let mut stats = BTreeMap::new();

        for (source, members) in &by_source {
            let ratings: Vec<f64> = members.iter().map(|&i| records[i].rating).collect();
            let pct = percentiles(&ratings);
            // A constant source centres on its own value so every z is exactly 0.
            let m = if is_constant(&ratings) {
                ratings.first().copied().unwrap_or(0.0)
            } else {
                mean(&ratings).unwrap_or(0.0)
            };
            let std = population_std(&ratings, m);

            for (k, &i) in members.iter().enumerate() {
                let s = &mut annotated[i];
                s.norm = pct[k];
                s.rating_z = (ratings[k] - m) / std;
                s.total_in_src = members.len();
            }

            debug!(source = %source, n = members.len(), mean = m, std, "Source statistics");
            stats.insert(
                source.clone(),
                SourceStats {
                    count: members.len(),
                    mean: m,
                    std,
                },
            );
        }

        for members in by_country.values() {
            let ratings: Vec<f64> = members.iter().map(|&i| records[i].rating).collect();
            for (k, g) in percentiles(&ratings).into_iter().enumerate() {
                annotated[members[k]].geo_norm = g;
            }
        }

        let records = records
            .into_iter()
            .zip(annotated)
            .map(|(record, stats)| AnnotatedRecord { record, stats })
            .collect();

        NormalisedBatch { records, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talentscout_test_utils::{assert_close, population};

    fn norms(batch: &NormalisedBatch) -> Vec<f64> {
        batch.records().iter().map(|r| r.stats.norm).collect()
    }

    #[test]
    fn test_tied_ratings_share_max_percentile() {
        let batch = Normalizer::new().normalise(population("A", &[1000.0, 800.0, 800.0]));
        assert_eq!(norms(&batch), vec![1.0, 0.5, 0.5]);
    }

    #[test]
    fn test_best_rating_gets_full_percentile() {
        let batch = Normalizer::new().normalise(population("A", &[3.0, 9.0, 1.0, 4.0]));
        let best = batch
            .records()
            .iter()
            .find(|r| r.record.rating == 9.0)
            .unwrap();
        assert_eq!(best.stats.norm, 1.0);
        assert!(batch.records().iter().all(|r| r.stats.total_in_src == 4));
    }

    #[test]
    fn test_single_member_source() {
        let batch = Normalizer::new().normalise(population("solo", &[1234.0]));
        let s = batch.records()[0].stats;
        assert_eq!(s.norm, 1.0);
        assert_eq!(s.rating_z, 0.0);
        assert_eq!(batch.source_stats("solo").unwrap().std, 1.0);
    }

    #[test]
    fn test_zero_variance_gives_zero_z() {
        let batch = Normalizer::new().normalise(population("flat", &[1500.0; 5]));
        assert!(batch.records().iter().all(|r| r.stats.rating_z == 0.0));
        assert!(batch.records().iter().all(|r| r.stats.norm == 1.0));
    }

    #[test]
    fn test_inexact_constant_ratings_give_zero_z() {
        for (v, n) in [(0.1, 3), (0.7, 7), (1500.3, 7)] {
            let batch = Normalizer::new().normalise(population("flat", &vec![v; n]));
            assert!(batch.records().iter().all(|r| r.stats.rating_z == 0.0), "v = {v}");
            let stats = batch.source_stats("flat").unwrap();
            assert_eq!(stats.std, 1.0);
            assert_eq!(stats.mean, v);
        }
    }

    #[test]
    fn test_z_scores_use_population_std() {
        let batch = Normalizer::new().normalise(population("A", &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]));
        let stats = batch.source_stats("A").unwrap();
        assert_eq!(stats.mean, 5.0);
        assert_eq!(stats.std, 2.0);
        assert_close!(batch.records()[7].stats.rating_z, 2.0);
        assert_close!(batch.records()[0].stats.rating_z, -1.5);
    }

    #[test]
    fn test_sources_are_independent() {
        let mut records = population("A", &[100.0, 200.0]);
        records.extend(population("B", &[5.0]));
        let batch = Normalizer::new().normalise(records);
        assert_eq!(norms(&batch), vec![0.0, 1.0, 1.0]);
        assert_eq!(batch.stats().len(), 2);
    }

    #[test]
    fn test_geo_percentile_by_source_and_country() {
        let records = vec![
            RawRecord::new("cf", "a", 3000.0).with_country("RU"),
            RawRecord::new("cf", "b", 2000.0).with_country("RU"),
            RawRecord::new("cf", "c", 2500.0).with_country("JP"),
            RawRecord::new("cf", "d", 2900.0),
            RawRecord::new("ac", "e", 1000.0).with_country("RU"),
        ];
        let batch = Normalizer::new().normalise(records);
        let geo: Vec<f64> = batch.records().iter().map(|r| r.stats.geo_norm).collect();
        assert_eq!(geo, vec![1.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unrated_record_still_ranked() {
        let batch = Normalizer::new().normalise(population("A", &[0.0, 10.0, 20.0]));
        assert_eq!(batch.records()[0].stats.norm, 0.0);
        assert!(batch.records()[0].stats.rating_z < 0.0);
    }
}
