//! Shared fixtures for Talentscout tests.

use chrono::NaiveDate;
use talentscout_common::{AnnotatedRecord, RawRecord, RecordStats};

pub use pretty_assertions::assert_eq;

/// Tolerance used by `assert_close!`.
pub const EPS: f64 = 1e-9;

/// Assert two floats are within `EPS` (or an explicit tolerance).
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr) => {
        $crate::assert_close!($left, $right, $crate::EPS)
    };
    ($left:expr, $right:expr, $tol:expr) => {{
        let (l, r): (f64, f64) = ($left, $right);
        assert!(
            (l - r).abs() <= $tol,
            "assert_close failed: {} vs {} (tolerance {})",
            l,
            r,
            $tol
        );
    }};
}

/// Raw record with an explicit display name.
pub fn named(source: &str, handle: &str, name: &str, rating: f64) -> RawRecord {
    RawRecord::new(source, handle, rating).with_name(name)
}

/// Ratings on one source, handles `<source>-<i>`.
pub fn population(source: &str, ratings: &[f64]) -> Vec<RawRecord> {
    ratings
        .iter()
        .enumerate()
        .map(|(i, &r)| RawRecord::new(source, &format!("{source}-{i}"), r))
        .collect()
}

/// Annotated record with neutral statistics.
pub fn annotated(record: RawRecord) -> AnnotatedRecord {
    AnnotatedRecord::new(record)
}

/// Annotated record with explicit statistics.
pub fn annotated_with(record: RawRecord, stats: RecordStats) -> AnnotatedRecord {
    AnnotatedRecord { record, stats }
}

/// Fixture date.
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}
