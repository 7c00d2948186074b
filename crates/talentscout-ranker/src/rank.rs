//! Final ordering of scored identities.

use std::cmp::Ordering;

use talentscout_common::Identity;

/// Stable sort by score descending, then keep the first `top_n`.
///
/// Equal scores keep resolution order. Unscored identities sort last.
pub fn rank(mut identities: Vec<Identity>, top_n: usize) -> Vec<Identity> {
    identities.sort_by(|a, b| {
        let a = a.score().unwrap_or(f64::NEG_INFINITY);
        let b = b.score().unwrap_or(f64::NEG_INFINITY);
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });
    identities.truncate(top_n);
    identities
}
