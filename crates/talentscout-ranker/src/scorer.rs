//! Composite interestingness score.
//!
//! score = (base + momentum + geo + rising) × versatility + multi_source + rank_bonus
//!
//! - base:        1000 · sigmoid(z · z_multiplier) · base_multiplier
//!                (or 1000 · percentile when the base signal is `percentile`)
//! - momentum:    delta_sigma · momentum_per_sigma, signed
//! - geo:         geo_norm² · geo_max
//! - rising:      flat bonus when delta_sigma > rising_star_sigma
//! - versatility: 1 + min(cap, step · (sources − 1))
//! - multi:       flat bonus when the identity spans more than one source
//! - rank_bonus:  (total − rank + 1) / total · rank_bonus_max, rank-bonus sources only

use std::collections::BTreeSet;

use talentscout_common::{BaseInput, BaseSignal, EngineConfig, Identity, ReasonClause, ScoreCard};
use tracing::debug;

use crate::stats::{sigmoid, unified_z};

/// Scale of the base term.
const BASE_SCALE: f64 = 1000.0;

/// Pure, deterministic identity scorer.
#[derive(Debug, Clone)]
pub struct Scorer {
    config: EngineConfig,
    rank_bonus_sources: BTreeSet<String>,
}

impl Scorer {
    /// Scorer with no rank-bonus source.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
            rank_bonus_sources: BTreeSet::new(),
        }
    }

    /// Sources whose records earn the rank bonus, usually
    /// [`EngineConfig::rank_bonus_sources`] for the current batch.
    pub fn with_rank_bonus_sources(mut self, sources: BTreeSet<String>) -> Self {
        self.rank_bonus_sources = sources;
        self
    }

    pub fn rank_bonus_sources(&self) -> &BTreeSet<String> {
        &self.rank_bonus_sources
    }

    /// Score one identity from its authoritative record's statistics.
    pub fn score(&self, ident: &Identity) -> ScoreCard {
        let w = &self.config.weights;
        let profile = self.config.profile(&ident.source);
        let s = ident.stats;

        let base_input = match self.config.base_signal {
            BaseSignal::RatingZ => BaseInput::Z(s.rating_z * profile.z_multiplier),
            BaseSignal::UnifiedZ => BaseInput::Z(unified_z(s.norm) * profile.z_multiplier),
            BaseSignal::Percentile => BaseInput::Percentile(s.norm.clamp(0.0, 1.0)),
        };
        let base = match base_input {
            BaseInput::Z(z) => BASE_SCALE * sigmoid(z),
            BaseInput::Percentile(p) => BASE_SCALE * p,
        } * profile.base_multiplier;

        let momentum = s.delta_sigma * w.momentum_per_sigma;
        let geo_bonus = s.geo_norm.powi(2) * w.geo_max;
        let rising_bonus = if s.delta_sigma > w.rising_star_sigma {
            w.rising_star_bonus
        } else {
            0.0
        };

        let versatility = ident.versatility();
        let extra_sources = versatility.saturating_sub(1) as f64;
        let versatility_factor = 1.0 + (w.versatility_step * extra_sources).min(w.versatility_cap);
        let multi_source_bonus = if versatility > 1 {
            w.multi_source_bonus
        } else {
            0.0
        };

        let rank_bonus = self.rank_bonus(ident);

        let total = (base + momentum + geo_bonus + rising_bonus) * versatility_factor
            + multi_source_bonus
            + rank_bonus;

        let mut clauses = vec![ReasonClause::Rating {
            rating: ident.rating,
            source: ident.source.clone(),
        }];
        clauses.push(match base_input {
            BaseInput::Z(z) => ReasonClause::ZScore { z },
            BaseInput::Percentile(norm) => ReasonClause::Percentile { norm },
        });
        if momentum != 0.0 {
            clauses.push(ReasonClause::Momentum {
                delta_sigma: s.delta_sigma,
            });
        }
        if geo_bonus != 0.0 {
            clauses.push(ReasonClause::Geography {
                bonus: geo_bonus,
                geo_norm: s.geo_norm,
                country: ident.country.clone().unwrap_or_default(),
            });
        }
        if rising_bonus != 0.0 {
            clauses.push(ReasonClause::RisingStar);
        }
        if rank_bonus != 0.0 {
            clauses.push(ReasonClause::RankBonus { bonus: rank_bonus });
        }
        if let Some(date) = ident.first_seen {
            clauses.push(ReasonClause::FirstSeen { date });
        }
        if versatility > 1 {
            clauses.push(ReasonClause::MultiPlatform {
                sources: versatility,
            });
        }

        ScoreCard {
            base_input,
            base,
            momentum,
            geo_bonus,
            rising_bonus,
            versatility_factor,
            multi_source_bonus,
            rank_bonus,
            total,
            clauses,
        }
    }

    /// Attach a score card to every identity.
    pub fn score_all(&self, identities: &mut [Identity]) {
        for ident in identities.iter_mut() {
            let card = self.score(ident);
            debug!(identity = %ident.name, score = card.total, "Scored identity");
            ident.score_card = Some(card);
        }
    }

    fn rank_bonus(&self, ident: &Identity) -> f64 {
        if !self.rank_bonus_sources.contains(&ident.source) {
            return 0.0;
        }
        let total = ident.stats.total_in_src;
        match ident.rank {
            Some(rank) if total > 1 => {
                let total = total as f64;
                ((total - rank as f64 + 1.0) / total * self.config.weights.rank_bonus_max).max(0.0)
            }
            _ => 0.0,
        }
    }
}
