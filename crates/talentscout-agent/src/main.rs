//! Talentscout — Competitive-programmer identity resolution and ranking.
//! Entry point for the daily batch binary.

mod config;
mod report;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use talentscout_common::RawRecord;
use talentscout_ingestion::cache::RawCache;
use talentscout_ingestion::first_seen::FirstSeenStore;
use talentscout_ingestion::snapshot::SnapshotStore;
use talentscout_ranker::pipeline::Pipeline;
use talentscout_ranker::snapshot_provider::SnapshotStoreAdapter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Gather today's raw records from the ingestion catalog, in configured
/// source order.
fn load_batch(config: &config::Config, today: NaiveDate) -> Vec<RawRecord> {
    let cache = RawCache::from_env(&config.ingestion.catalog_path);
    let sources = if config.ingestion.sources.is_empty() {
        cache.sources()
    } else {
        config.ingestion.sources.clone()
    };

    let mut records = Vec::new();
    for source in &sources {
        let data = if config.ingestion.require_fresh {
            cache.get_cached(source, today)
        } else {
            cache.get_latest(source).map(|entry| entry.data)
        };
        match data {
            Some(data) => {
                info!(source = %source, n = data.len(), "Loaded source records");
                records.extend(data);
            }
            None => warn!(source = %source, "No usable cached records, skipping source"),
        }
    }
    records
}

fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("talentscout=debug,info")),
        )
        .init();

    info!("Talentscout starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::load().context("loading configuration")?;
    info!(
        threshold = config.engine.fuzzy_threshold,
        top_n = config.engine.top_n,
        base_signal = ?config.engine.base_signal,
        "Configuration loaded"
    );

    let today = Local::now().date_naive();
    let mut records = load_batch(&config, today);
    if records.is_empty() {
        warn!("No records to score; run the fetchers first");
        return Ok(());
    }

    let mut first_seen = FirstSeenStore::load(&config.first_seen.path);
    first_seen.fill(&mut records, today);

    let snapshots = SnapshotStoreAdapter::load(SnapshotStore::new(&config.snapshots.dir), today);
    let pipeline = Pipeline::new(config.engine.clone())?;
    let output = pipeline.run(records.clone(), snapshots.as_provider())?;

    snapshots
        .save_today(&records)
        .context("saving today's rating snapshot")?;
    first_seen.save().context("saving first-seen map")?;

    let markdown = report::render(&output.ranked, &config.report);
    std::fs::write(&config.report.output, markdown)
        .with_context(|| format!("writing report to {}", config.report.output.display()))?;
    info!(path = %config.report.output.display(), ranked = output.ranked.len(), "Report written");

    if let Some(ref path) = config.report.run_summary {
        let summary = serde_json::to_string_pretty(&output.report)?;
        std::fs::write(path, summary)
            .with_context(|| format!("writing run summary to {}", path.display()))?;
    }

    Ok(())
}
