//! Resolution properties over whole batches.

use talentscout_common::{AnnotatedRecord, RawRecord};
use talentscout_ingestion::dedup::{absorb, new_identity, IdentityResolver};
use talentscout_test_utils::{annotated, assert_eq, named};

fn batch() -> Vec<AnnotatedRecord> {
    vec![
        annotated(named("codeforces", "tourist", "Gennady Korotkevich", 3800.0).with_rank(1)),
        annotated(named("codeforces", "petr", "Petr Mitrichev", 3100.0).with_rank(2)),
        annotated(named("atcoder", "tourist", "gennady korotkevich", 3700.0).with_rank(1)),
        annotated(named("atcoder", "petr", "Petr Mitrichv", 3200.0).with_rank(2)),
        annotated(named("kaggle", "cpmp", "CPMP", 14.0)),
        annotated(named("leetcode", "lee215", "Lee", 3000.0)),
        annotated(named("leetcode", "ghost", "", 1800.0)),
    ]
}

#[test]
fn test_resolution_is_idempotent_in_size() {
    let resolver = IdentityResolver::new(88.0);
    let first = resolver.resolve(&batch());

    let expanded: Vec<AnnotatedRecord> = first
        .iter()
        .flat_map(|ident| ident.to_raw_records())
        .map(AnnotatedRecord::new)
        .collect();
    let second = resolver.resolve(&expanded);

    assert_eq!(first.len(), 5);
    assert_eq!(second.len(), first.len());
}

#[test]
fn test_resolution_is_deterministic() {
    let resolver = IdentityResolver::new(88.0).with_exact_index(true);
    assert_eq!(resolver.resolve(&batch()), resolver.resolve(&batch()));
}

#[test]
fn test_petr_promotes_to_atcoder() {
    let out = IdentityResolver::new(88.0).resolve(&batch());
    let petr = out.iter().find(|i| i.name == "Petr Mitrichev").unwrap();
    assert_eq!(petr.rating, 3200.0);
    assert_eq!(petr.source, "atcoder");
    assert_eq!(petr.versatility(), 2);
}

#[test]
fn test_blank_name_falls_back_to_handle() {
    let out = IdentityResolver::new(88.0).resolve(&batch());
    assert!(out.iter().any(|i| i.name == "ghost"));
}

#[test]
fn test_merge_monotonicity() {
    let mut ident = new_identity(&annotated(named("kaggle", "aw", "Alice", 900.0)));
    let before = ident.handles.clone();

    let better = annotated(RawRecord::new("codeforces", "al", 1500.0).with_name("Alice"));
    assert!(absorb(&mut ident, &better));

    assert_eq!(ident.rating, 1500.0);
    assert_eq!(ident.source, "codeforces");
    assert!(before.iter().all(|(s, h)| ident.handles.get(s) == Some(h)));
    assert_eq!(ident.handles.get("codeforces").map(String::as_str), Some("al"));
    assert!(ident.handles.len() > before.len());
}

#[test]
fn test_alice_merge_below_default_threshold() {
    // "Alice" vs "Alice W." scores 76.9, so the merge needs a looser threshold.
    let records = vec![
        annotated(named("codeforces", "al", "Alice", 1500.0)),
        annotated(named("kaggle", "aliceW", "Alice W.", 1200.0)),
    ];
    assert_eq!(IdentityResolver::new(88.0).resolve(&records).len(), 2);

    let merged = IdentityResolver::new(75.0).resolve(&records);
    assert_eq!(merged.len(), 1);
    let alice = &merged[0];
    assert_eq!(alice.rating, 1500.0);
    assert_eq!(alice.source, "codeforces");
    assert_eq!(alice.handles.get("kaggle").map(String::as_str), Some("aliceW"));
    assert_eq!(alice.versatility(), 2);
}
