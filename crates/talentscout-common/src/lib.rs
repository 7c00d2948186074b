//! talentscout-common — Shared types, errors, and configuration used across all Talentscout crates.

pub mod error;
pub mod records;
pub mod score_card;
pub mod engine_config;

// Re-export commonly used types
pub use error::{Result, ScoutError};
pub use records::{AnnotatedRecord, Identity, RawRecord, RecordStats};
pub use engine_config::{BaseSignal, EngineConfig, ScoreWeights, SourceProfile};
pub use score_card::{BaseInput, ReasonClause, ScoreCard};
