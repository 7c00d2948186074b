//! Configuration loading for Talentscout.
//! Reads talentscout.toml from the current directory or path in TALENTSCOUT_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use talentscout_common::EngineConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub snapshots: SnapshotConfig,
    #[serde(default)]
    pub first_seen: FirstSeenConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// JSON catalog written by the fetchers.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    /// Only use catalog entries fetched today.
    #[serde(default = "bool_true")]
    pub require_fresh: bool,
    /// Sources to score, in input order. Empty = every source in the catalog.
    #[serde(default)]
    pub sources: Vec<String>,
}

fn default_catalog_path() -> PathBuf { PathBuf::from("data/raw_catalog.json") }
fn bool_true()            -> bool    { true }

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            require_fresh: bool_true(),
            sources: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_snapshot_dir")]
    pub dir: PathBuf,
}

fn default_snapshot_dir() -> PathBuf { PathBuf::from("data/snapshots") }

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { dir: default_snapshot_dir() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirstSeenConfig {
    #[serde(default = "default_first_seen_path")]
    pub path: PathBuf,
}

fn default_first_seen_path() -> PathBuf { PathBuf::from("data/first_seen.json") }

impl Default for FirstSeenConfig {
    fn default() -> Self {
        Self { path: default_first_seen_path() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_report_output")]
    pub output: PathBuf,
    #[serde(default = "default_report_title")]
    pub title: String,
    /// Handle shown next to each name: first source present wins.
    #[serde(default = "default_preferred_handles")]
    pub preferred_handles: Vec<String>,
    /// Optional JSON dump of the pipeline run summary.
    #[serde(default)]
    pub run_summary: Option<PathBuf>,
}

fn default_report_output() -> PathBuf { PathBuf::from("report.md") }
fn default_report_title()  -> String  { "Talent Identification Report".to_string() }
fn default_preferred_handles() -> Vec<String> {
    vec!["codeforces".to_string(), "atcoder".to_string()]
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_report_output(),
            title: default_report_title(),
            preferred_handles: default_preferred_handles(),
            run_summary: None,
        }
    }
}


impl Config {
    /// Load configuration from talentscout.toml.
    /// Checks TALENTSCOUT_CONFIG env var first, then current directory.
    /// Without either, every section takes its defaults.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("TALENTSCOUT_CONFIG") {
            Ok(path) => Self::load_from(&path),
            Err(_) if Path::new("talentscout.toml").exists() => Self::load_from("talentscout.toml"),
            Err(_) => {
                tracing::warn!("No talentscout.toml found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!(
                "Config file not found: {}\n\
                 Copy talentscout.example.toml to talentscout.toml and edit it.",
                path.display()
            );
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.engine.validate()?;
        Ok(config)
    }
}
