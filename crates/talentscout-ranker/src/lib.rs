//! talentscout-ranker — Cross-source statistics and scoring engine.
//! Normalisation, momentum, composite scoring and ranking, chained by an
//! explicit typed pipeline.

pub mod stats;
pub mod normalise;
pub mod momentum;
pub mod snapshot_provider;
pub mod scorer;
pub mod rank;
pub mod pipeline;
