//! Day-over-day rating movement in source standard deviations.

use std::collections::BTreeMap;

use talentscout_common::AnnotatedRecord;
use tracing::{debug, info};

use crate::normalise::{NormalisedBatch, SourceStats};
use crate::snapshot_provider::SnapshotProvider;

/// Fully annotated batch, ready for identity resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedBatch {
    records: Vec<AnnotatedRecord>,
    stats: BTreeMap<String, SourceStats>,
    /// Records that had a prior rating.
    matched: usize,
}

impl AnnotatedBatch {
    pub fn records(&self) -> &[AnnotatedRecord] {
        &self.records
    }

    pub fn source_stats(&self, source: &str) -> Option<&SourceStats> {
        self.stats.get(source)
    }

    pub fn matched(&self) -> usize {
        self.matched
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Second pipeline stage. Consumes a [`NormalisedBatch`] so today's
/// per-source std is always available.
#[derive(Debug, Clone, Default)]
pub struct MomentumTracker;

impl MomentumTracker {
    pub fn new() -> Self {
        Self
    }

    /// Set `delta_sigma = (today − previous) / today_std` for every record
    /// whose `(source, handle)` appears in `previous`; 0 otherwise.
    pub fn apply(
        &self,
        batch: NormalisedBatch,
        previous: Option<&dyn SnapshotProvider>,
    ) -> AnnotatedBatch {
        let (mut records, stats) = batch.into_parts();
        let mut matched = 0usize;

        match previous {
            Some(prev) => {
                for rec in &mut records {
                    let Some(before) = prev.previous_rating(&rec.record.source, &rec.record.handle)
                    else {
                        continue;
                    };
                    let std = stats.get(&rec.record.source).map_or(1.0, |s| s.std);
                    rec.stats.delta_sigma = (rec.record.rating - before) / std;
                    matched += 1;
                }
                info!(
                    matched,
                    records = records.len(),
                    snapshot_entries = prev.entry_count(),
                    "Momentum computed"
                );
            }
            None => debug!("No previous snapshot, momentum is zero"),
        }

        AnnotatedBatch {
            records,
            stats,
            matched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalise::Normalizer;
    use crate::snapshot_provider::MockSnapshotProvider;
    use talentscout_test_utils::{assert_close, population};

    #[test]
    fn test_delta_sigma_uses_today_std() {
        // ratings 2,4,4,4,5,5,7,9 → std 2
        let batch = Normalizer::new().normalise(population("A", &[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]));
        let prev = MockSnapshotProvider::new().with("A", "A-7", 5.0).with("A", "A-0", 3.0);
        let out = MomentumTracker::new().apply(batch, Some(&prev));

        assert_close!(out.records()[7].stats.delta_sigma, 2.0);
        assert_close!(out.records()[0].stats.delta_sigma, -0.5);
        assert_eq!(out.records()[3].stats.delta_sigma, 0.0);
        assert_eq!(out.matched(), 2);
    }

    #[test]
    fn test_no_snapshot_means_zero() {
        let batch = Normalizer::new().normalise(population("A", &[1.0, 2.0]));
        let out = MomentumTracker::new().apply(batch, None);
        assert!(out.records().iter().all(|r| r.stats.delta_sigma == 0.0));
        assert_eq!(out.matched(), 0);
    }

    #[test]
    fn test_handle_on_other_source_ignored() {
        let batch = Normalizer::new().normalise(population("A", &[10.0, 20.0]));
        let prev = MockSnapshotProvider::new().with("B", "A-0", 0.0);
        let out = MomentumTracker::new().apply(batch, Some(&prev));
        assert_eq!(out.records()[0].stats.delta_sigma, 0.0);
    }

    #[test]
    fn test_zero_variance_source_divides_by_one() {
        let batch = Normalizer::new().normalise(population("flat", &[100.0, 100.0]));
        let prev = MockSnapshotProvider::new().with("flat", "flat-1", 97.0);
        let out = MomentumTracker::new().apply(batch, Some(&prev));
        assert_eq!(out.records()[1].stats.delta_sigma, 3.0);
    }

    #[test]
    fn test_inexact_constant_source_keeps_momentum_bounded() {
        let batch = Normalizer::new().normalise(population("A", &[1500.3; 7]));
        let prev = MockSnapshotProvider::new().with("A", "A-0", 1500.0);
        let out = MomentumTracker::new().apply(batch, Some(&prev));
        assert_close!(out.records()[0].stats.delta_sigma, 0.3);
    }
}
