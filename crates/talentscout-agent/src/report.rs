//! Markdown report for the ranked identities.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use talentscout_common::Identity;

use crate::config::ReportConfig;

/// Render the ranked list as Markdown.
pub fn render(ranked: &[Identity], config: &ReportConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", config.title);
    out.push('\n');
    out.push_str(&coverage_note(ranked));
    out.push_str("\n\n");

    for (i, ident) in ranked.iter().enumerate() {
        let handle = ident.preferred_handle(&config.preferred_handles).unwrap_or("?");
        let score = ident.score().unwrap_or(0.0);
        let _ = writeln!(out, "## {}. {} ({}) — {:.1}", i + 1, ident.name, handle, score);
        if let Some(card) = &ident.score_card {
            for clause in &card.clauses {
                let _ = writeln!(out, "- {clause}");
            }
        }
        out.push('\n');
    }
    out
}

/// Note on how many ranked identities lack a country code, overall and per
/// authoritative source.
fn coverage_note(ranked: &[Identity]) -> String {
    let missing = |i: &&Identity| i.country.as_deref().map_or(true, |c| c.trim().is_empty());

    let total_missing = ranked.iter().filter(missing).count();
    let mut by_source: BTreeMap<&str, usize> = BTreeMap::new();
    for ident in ranked.iter().filter(missing) {
        *by_source.entry(ident.source.as_str()).or_default() += 1;
    }

    let mut note = format!(
        "> Note: country metadata is sparse: {}/{} profiles lack a country code.",
        total_missing,
        ranked.len()
    );
    if !by_source.is_empty() {
        let parts: Vec<String> = by_source
            .iter()
            .map(|(source, n)| format!("{source} {n}"))
            .collect();
        let _ = write!(note, " Missing by source: {}.", parts.join(", "));
    }
    note
}
