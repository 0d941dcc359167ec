// src/config.rs
//! One TOML file drives a run: the `[[targets]]` to scrape, the `[filter]`
//! rule set, dedupe tuning, and output paths. Missing tables fall back to
//! defaults, so a bare `[[targets]]` list is a valid config.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pipeline::{DedupeOptions, FilterRules};

pub const ENV_CONFIG_PATH: &str = "SCOUT_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/scout.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub targets: Vec<Target>,
    pub filter: FilterRules,
    pub dedupe: DedupeOptions,
    pub output: OutputConfig,
}

/// One upstream company/board to scrape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Target {
    /// Display name, also used as the posting's `company`.
    pub name: String,
    /// Adapter key: "greenhouse", "lever", "rss".
    pub ats: String,
    /// Board slug for API-backed sources.
    pub slug: String,
    /// Feed URLs for the rss adapter.
    pub rss_feeds: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub report_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: PathBuf::from("docs/daily_report.html"),
        }
    }
}

pub fn load_from(path: &Path) -> Result<ScoutConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let cfg: ScoutConfig = toml::from_str(&content)
        .with_context(|| format!("parsing config at {}", path.display()))?;
    Ok(cfg)
}

/// Resolve the config path: $SCOUT_CONFIG_PATH, else `config/scout.toml`.
pub fn load_default() -> Result<ScoutConfig> {
    let path = std::env::var(ENV_CONFIG_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
    load_from(&path)
}

/// Comma-separated env list, trimmed, empties dropped
/// (ALLOW_LOCATIONS / DENY_LOCATIONS).
pub fn split_env_list(name: &str) -> Vec<String> {
    std::env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// SKIP_FILTER=1 bypasses the filter engine for a pass-through debug run.
pub fn skip_filter_enabled() -> bool {
    std::env::var("SKIP_FILTER").ok().as_deref() == Some("1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn parses_full_config() {
        let toml = r#"
[[targets]]
name = "Acme"
ats = "greenhouse"
slug = "acme"

[[targets]]
name = "Beta"
ats = "rss"
rss_feeds = ["https://beta.example/careers.xml"]

[filter]
include = ["engineer"]
max_age_days = 30
allow_unlocated = false

[filter.companies.Acme]
include = ["scientist"]

[filter.location]
include = ["berlin"]
exclude = ["onsite only"]

[dedupe]
similarity_threshold = 95.0
"#;
        let cfg: ScoutConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.targets.len(), 2);
        assert_eq!(cfg.targets[1].rss_feeds.len(), 1);
        assert_eq!(cfg.filter.max_age_days, Some(30));
        assert!(!cfg.filter.allow_unlocated);
        assert!(cfg.filter.companies.contains_key("Acme"));
        assert_eq!(cfg.dedupe.similarity_threshold, 95.0);
        assert_eq!(cfg.output.report_path, PathBuf::from("docs/daily_report.html"));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: ScoutConfig = toml::from_str("").unwrap();
        assert!(cfg.targets.is_empty());
        assert!(cfg.filter.allow_unlocated);
        assert_eq!(cfg.filter.max_age_days, None);
    }

    #[serial_test::serial]
    #[test]
    fn env_list_splits_and_trims() {
        env::set_var("SCOUT_TEST_LOCS", " Berlin , ,Remote,");
        assert_eq!(split_env_list("SCOUT_TEST_LOCS"), vec!["Berlin", "Remote"]);
        env::remove_var("SCOUT_TEST_LOCS");
        assert!(split_env_list("SCOUT_TEST_LOCS").is_empty());
    }

    #[serial_test::serial]
    #[test]
    fn env_path_override_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("scout.toml");
        fs::write(&path, "[[targets]]\nname = \"X\"\nats = \"lever\"\nslug = \"x\"\n").unwrap();

        env::set_var(ENV_CONFIG_PATH, path.display().to_string());
        let cfg = load_default().unwrap();
        assert_eq!(cfg.targets[0].name, "X");
        env::remove_var(ENV_CONFIG_PATH);
    }
}
