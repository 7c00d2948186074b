//! Name similarity used as the duplicate-person heuristic.
//!
//! `token_sort_ratio` splits both names on whitespace, sorts the tokens,
//! re-joins them and compares the results with an Indel-normalised ratio
//! (insertions and deletions only), on a 0–100 scale.

use rapidfuzz::distance::indel;

/// Token-order-insensitive similarity in [0, 100].
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Indel-normalised similarity of two strings in [0, 100].
/// Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    100.0 * indel::normalized_similarity(a.chars(), b.chars())
}

/// True when `a` and `b` name the same person: case-insensitive equality,
/// or token-sort similarity at or above `threshold`.
pub fn is_duplicate(a: &str, b: &str, threshold: f64) -> bool {
    if a.to_lowercase() == b.to_lowercase() {
        return true;
    }
    token_sort_ratio(a, b) >= threshold
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
