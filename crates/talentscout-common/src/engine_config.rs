//! Engine configuration.
//!
//! Everything the engine can be tuned with lives here and is passed in at
//! construction; no stage reads process-wide state. Loadable from TOML,
//! YAML or JSON, every field defaulted.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};
use crate::records::RawRecord;

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Token-sort similarity (0–100) at or above which two names are the same person.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Number of identities handed to the report.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Source receiving the rank bonus. `None` means auto-detect.
    #[serde(default)]
    pub rank_bonus_source: Option<String>,

    /// Statistic feeding the base score.
    #[serde(default)]
    pub base_signal: BaseSignal,

    /// Use the exact-name index during resolution.
    #[serde(default)]
    pub blocking_index: bool,

    /// Per-source tuning, keyed by source name.
    #[serde(default)]
    pub sources: BTreeMap<String, SourceProfile>,

    /// Score term constants.
    #[serde(default)]
    pub weights: ScoreWeights,
}

fn default_fuzzy_threshold() -> f64 { 88.0 }
fn default_top_n() -> usize { 25 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            top_n: default_top_n(),
            rank_bonus_source: None,
            base_signal: BaseSignal::default(),
            blocking_index: false,
            sources: BTreeMap::new(),
            weights: ScoreWeights::default(),
        }
    }
}

// ── Base signal ───────────────────────────────────────────────────────────────

/// Statistic the scorer maps onto the 0–1000 base range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseSignal {
    /// Per-source rating z-score through a sigmoid.
    #[default]
    RatingZ,
    /// Percentile mapped through the inverse normal CDF, then the sigmoid.
    UnifiedZ,
    /// Percentile scaled linearly.
    Percentile,
}

// ── Per-source profile ────────────────────────────────────────────────────────

/// Tuning for one source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceProfile {
    /// Multiplies the base score.
    #[serde(default = "default_multiplier")]
    pub base_multiplier: f64,

    /// Multiplies the z-score before the sigmoid.
    #[serde(default = "default_multiplier")]
    pub z_multiplier: f64,

    /// Whether this source's complete rank list earns the rank bonus.
    #[serde(default)]
    pub rank_bonus_eligible: bool,
}

fn default_multiplier() -> f64 { 1.0 }

impl Default for SourceProfile {
    fn default() -> Self {
        Self {
            base_multiplier: default_multiplier(),
            z_multiplier: default_multiplier(),
            rank_bonus_eligible: false,
        }
    }
}

// ── Score weights ─────────────────────────────────────────────────────────────

/// Constants of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Points per standard deviation of day-over-day movement.
    #[serde(default = "default_momentum_per_sigma")]
    pub momentum_per_sigma: f64,
    /// Geography bonus at geo_norm = 1.
    #[serde(default = "default_geo_max")]
    pub geo_max: f64,
    #[serde(default = "default_rising_star_bonus")]
    pub rising_star_bonus: f64,
    /// delta_sigma must exceed this for the rising-star bonus.
    #[serde(default = "default_rising_star_sigma")]
    pub rising_star_sigma: f64,
    /// Multiplier added per platform beyond the first.
    #[serde(default = "default_versatility_step")]
    pub versatility_step: f64,
    #[serde(default = "default_versatility_cap")]
    pub versatility_cap: f64,
    #[serde(default = "default_multi_source_bonus")]
    pub multi_source_bonus: f64,
    /// Rank bonus for rank 1.
    #[serde(default = "default_rank_bonus_max")]
    pub rank_bonus_max: f64,
}

fn default_momentum_per_sigma() -> f64 { 50.0 }
fn default_geo_max() -> f64 { 100.0 }
fn default_rising_star_bonus() -> f64 { 50.0 }
fn default_rising_star_sigma() -> f64 { 1.5 }
fn default_versatility_step() -> f64 { 0.1 }
fn default_versatility_cap() -> f64 { 0.25 }
fn default_multi_source_bonus() -> f64 { 50.0 }
fn default_rank_bonus_max() -> f64 { 300.0 }

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            momentum_per_sigma: default_momentum_per_sigma(),
            geo_max: default_geo_max(),
            rising_star_bonus: default_rising_star_bonus(),
            rising_star_sigma: default_rising_star_sigma(),
            versatility_step: default_versatility_step(),
            versatility_cap: default_versatility_cap(),
            multi_source_bonus: default_multi_source_bonus(),
            rank_bonus_max: default_rank_bonus_max(),
        }
    }
}

impl ScoreWeights {
    /// All constants must be finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("momentum_per_sigma", self.momentum_per_sigma),
            ("geo_max", self.geo_max),
            ("rising_star_bonus", self.rising_star_bonus),
            ("rising_star_sigma", self.rising_star_sigma),
            ("versatility_step", self.versatility_step),
            ("versatility_cap", self.versatility_cap),
            ("multi_source_bonus", self.multi_source_bonus),
            ("rank_bonus_max", self.rank_bonus_max),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoutError::Config(format!(
                    "weights.{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ── Helper Methods ─────────────────────────────────────────────────────────────

impl EngineConfig {
    /// Load from TOML file
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ScoutError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| ScoutError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.fuzzy_threshold) {
            return Err(ScoutError::Config(format!(
                "fuzzy_threshold must be within 0..=100, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.top_n == 0 {
            return Err(ScoutError::Config("top_n must be at least 1".to_string()));
        }
        for (source, profile) in &self.sources {
            for (name, value) in [
                ("base_multiplier", profile.base_multiplier),
                ("z_multiplier", profile.z_multiplier),
            ] {
                if !(value.is_finite() && value > 0.0) {
                    return Err(ScoutError::Config(format!(
                        "sources.{source}.{name} must be finite and positive, got {value}"
                    )));
                }
            }
        }
        self.weights.validate()
    }

    /// Profile for `source`, or the neutral default.
    pub fn profile(&self, source: &str) -> SourceProfile {
        self.sources.get(source).copied().unwrap_or_default()
    }

    /// Sources that receive the rank bonus for this batch.
    ///
    /// The explicit `rank_bonus_source` and every profile flagged
    /// `rank_bonus_eligible` are used when any exist. Otherwise the first
    /// source, in record order, whose every record carries a rank is chosen.
    pub fn rank_bonus_sources(&self, records: &[RawRecord]) -> BTreeSet<String> {
        let mut chosen: BTreeSet<String> = self
            .sources
            .iter()
            .filter(|(_, p)| p.rank_bonus_eligible)
            .map(|(s, _)| s.clone())
            .collect();
        if let Some(ref s) = self.rank_bonus_source {
            chosen.insert(s.clone());
        }
        if !chosen.is_empty() {
            return chosen;
        }

        let mut seen: Vec<&str> = Vec::new();
        for rec in records {
            if !seen.contains(&rec.source.as_str()) {
                seen.push(&rec.source);
            }
        }
        seen.into_iter()
            .find(|src| {
                records
                    .iter()
                    .filter(|r| r.source == *src)
                    .all(|r| r.rank.is_some())
            })
            .map(|src| BTreeSet::from([src.to_string()]))
            .unwrap_or_default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
