//! Per-identity score breakdown.
//!
//! The scorer fills one `ScoreCard` per identity. Every additive or
//! multiplicative term is kept so a report can explain the ranking without
//! re-deriving anything.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which statistic fed the base score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BaseInput {
    /// A z-score (per-source or unified), passed through the sigmoid.
    Z(f64),
    /// A raw percentile in [0, 1], scaled linearly.
    Percentile(f64),
}

/// One human-readable contributor to a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "clause", rename_all = "snake_case")]
pub enum ReasonClause {
    Rating { rating: f64, source: String },
    ZScore { z: f64 },
    Percentile { norm: f64 },
    Momentum { delta_sigma: f64 },
    Geography { bonus: f64, geo_norm: f64, country: String },
    RisingStar,
    RankBonus { bonus: f64 },
    FirstSeen { date: NaiveDate },
    MultiPlatform { sources: usize },
}

impl fmt::Display for ReasonClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasonClause::Rating { rating, source } => {
                write!(f, "rating {} on {}", rating.trunc() as i64, source)
            }
            ReasonClause::ZScore { z } => write!(f, "z {z:+.2}"),
            ReasonClause::Percentile { norm } => write!(f, "pct {:.1}%", norm * 100.0),
            ReasonClause::Momentum { delta_sigma } => write!(f, "Δσ {delta_sigma:+.1}"),
            ReasonClause::Geography { bonus, geo_norm, country } => write!(
                f,
                "geo +{} (pct {:.1}% in {})",
                bonus.trunc() as i64,
                geo_norm * 100.0,
                country
            ),
            ReasonClause::RisingStar => write!(f, "Rising star"),
            ReasonClause::RankBonus { bonus } => write!(f, "rank bonus +{}", bonus.trunc() as i64),
            ReasonClause::FirstSeen { date } => write!(f, "first seen {date} (local snapshot)"),
            ReasonClause::MultiPlatform { sources } => write!(f, "multi-platform ({sources})"),
        }
    }
}

/// Full breakdown of `score = (base + momentum + geo + rising) × versatility
/// + multi_source + rank_bonus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub base_input: BaseInput,
    pub base: f64,
    pub momentum: f64,
    pub geo_bonus: f64,
    pub rising_bonus: f64,
    pub versatility_factor: f64,
    pub multi_source_bonus: f64,
    pub rank_bonus: f64,
    pub total: f64,
    /// Ordered; clauses whose contribution is exactly zero are omitted.
    pub clauses: Vec<ReasonClause>,
}

impl ScoreCard {
    /// Clauses joined for single-line display.
    pub fn reason(&self) -> String {
        self.clauses
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
