//! talentscout-ingestion — Engine-facing side of profile ingestion.
//! - Identity resolution (exact + fuzzy name merge across sources)
//! - Token-sort name similarity
//! - Raw record cache catalog (one fetch per source per day)
//! - Daily rating snapshots for momentum
//! - First-seen handle dates

pub mod cache;
pub mod dedup;
pub mod first_seen;
pub mod similarity;
pub mod snapshot;
