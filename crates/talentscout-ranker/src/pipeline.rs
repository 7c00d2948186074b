//! End-to-end engine run.
//!
//! Stage order is fixed by the types each stage accepts:
//!
//! ```text
//! validate_records → Normalizer → MomentumTracker → IdentityResolver → Scorer → rank
//!    &[RawRecord]   NormalisedBatch  AnnotatedBatch     Vec<Identity>
//! ```

use std::time::Instant;

use serde::Serialize;
use talentscout_common::{EngineConfig, Identity, RawRecord, Result, ScoutError};
use talentscout_ingestion::dedup::IdentityResolver;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::momentum::MomentumTracker;
use crate::normalise::Normalizer;
use crate::rank::rank;
use crate::scorer::Scorer;
use crate::snapshot_provider::SnapshotProvider;

// ── Input validation ─────────────────────────────────────────────────────────

/// Reject records that break the caller contract: empty handle, empty
/// source, non-finite rating or a zero rank. Absent optional fields are
/// never an error.
pub fn validate_records(records: &[RawRecord]) -> Result<()> {
    for (index, rec) in records.iter().enumerate() {
        if rec.handle.trim().is_empty() {
            return Err(ScoutError::EmptyHandle {
                source_name: rec.source.clone(),
                index,
            });
        }
        if rec.source.trim().is_empty() {
            return Err(ScoutError::EmptySource {
                handle: rec.handle.clone(),
                index,
            });
        }
        if !rec.rating.is_finite() {
            return Err(ScoutError::NonFiniteRating {
                source_name: rec.source.clone(),
                handle: rec.handle.clone(),
            });
        }
        if rec.rank == Some(0) {
            return Err(ScoutError::InvalidRank {
                source_name: rec.source.clone(),
                handle: rec.handle.clone(),
            });
        }
    }
    Ok(())
}

// ── Run summary ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageTiming {
    pub stage: &'static str,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub records_in: usize,
    pub sources: usize,
    pub identities: usize,
    pub ranked: usize,
    /// Records with a rating in the previous snapshot.
    pub snapshot_matches: usize,
    pub rank_bonus_sources: Vec<String>,
    pub duration_ms: u64,
    pub stages: Vec<StageTiming>,
}

/// Ranked identities plus the run summary.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub ranked: Vec<Identity>,
    pub report: PipelineReport,
}

struct StageClock {
    last: Instant,
    stages: Vec<StageTiming>,
}

impl StageClock {
    fn start() -> Self {
        Self {
            last: Instant::now(),
            stages: Vec::new(),
        }
    }

    fn lap(&mut self, stage: &'static str) {
        let now = Instant::now();
        let duration_ms = now.duration_since(self.last).as_millis() as u64;
        debug!(stage, duration_ms, "Stage complete");
        self.stages.push(StageTiming { stage, duration_ms });
        self.last = now;
    }
}

// ── Pipeline orchestrator ────────────────────────────────────────────────────

/// The engine, configured once and run once per batch.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: EngineConfig,
    normalizer: Normalizer,
    momentum: MomentumTracker,
    resolver: IdentityResolver,
}

impl Pipeline {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            resolver: IdentityResolver::from_config(&config),
            normalizer: Normalizer::new(),
            momentum: MomentumTracker::new(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate, annotate, resolve, score and rank one batch.
    ///
    /// `previous` is the prior day's snapshot; `None` means every
    /// `delta_sigma` is 0. Only contract violations in `records` fail.
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn run(
        &self,
        records: Vec<RawRecord>,
        previous: Option<&dyn SnapshotProvider>,
    ) -> Result<PipelineOutput> {
        let run_id = Uuid::new_v4();
        let t0 = Instant::now();
        let mut clock = StageClock::start();
        info!(
            run_id = %run_id,
            records = records.len(),
            threshold = self.resolver.threshold(),
            "Starting scoring pipeline"
        );

        validate_records(&records)?;
        let records_in = records.len();
        let rank_bonus_sources = self.config.rank_bonus_sources(&records);
        clock.lap("validate");

        let normalised = self.normalizer.normalise(records);
        let sources = normalised.stats().len();
        clock.lap("normalise");

        let annotated = self.momentum.apply(normalised, previous);
        let snapshot_matches = annotated.matched();
        clock.lap("momentum");

        let mut identities = self.resolver.resolve(annotated.records());
        let identity_count = identities.len();
        clock.lap("resolve");

        let scorer = Scorer::new(&self.config).with_rank_bonus_sources(rank_bonus_sources);
        scorer.score_all(&mut identities);
        clock.lap("score");

        let ranked = rank(identities, self.config.top_n);
        clock.lap("rank");

        let report = PipelineReport {
            run_id,
            records_in,
            sources,
            identities: identity_count,
            ranked: ranked.len(),
            snapshot_matches,
            rank_bonus_sources: scorer.rank_bonus_sources().iter().cloned().collect(),
            duration_ms: t0.elapsed().as_millis() as u64,
            stages: clock.stages,
        };

        info!(
            run_id         = %run_id,
            records_in     = report.records_in,
            sources        = report.sources,
            identities     = report.identities,
            ranked         = report.ranked,
            snapshot_hits  = report.snapshot_matches,
            duration_ms    = report.duration_ms,
            "Scoring pipeline complete"
        );

        Ok(PipelineOutput { ranked, report })
    }
}
