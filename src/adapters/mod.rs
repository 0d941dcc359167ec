// src/adapters/mod.rs
//! Thin per-ATS fetchers. Each adapter turns one board's API or feed into
//! raw [`Posting`] records and nothing more; normalization, filtering, and
//! dedupe happen downstream. A failing source logs a warning and yields
//! nothing so the run continues over the remaining targets.

pub mod greenhouse;
pub mod lever;
pub mod rss;

use anyhow::Result;

use crate::config::Target;
use crate::posting::Posting;

pub const USER_AGENT: &str = "job-scout/1.0";

#[async_trait::async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch(&self, target: &Target) -> Result<Vec<Posting>>;
    fn name(&self) -> &'static str;
}

/// Map an `ats` key from the targets file to its adapter.
pub fn for_ats(ats: &str) -> Option<Box<dyn JobSource>> {
    match ats.to_ascii_lowercase().as_str() {
        "greenhouse" => Some(Box::new(greenhouse::GreenhouseSource::new())),
        "lever" => Some(Box::new(lever::LeverSource::new())),
        "rss" => Some(Box::new(rss::RssSource::new())),
        _ => None,
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}

/// Fetch every configured target sequentially, warning and continuing on
/// unsupported or failing sources.
pub async fn fetch_all(targets: &[Target]) -> Vec<Posting> {
    let mut all = Vec::new();
    for target in targets {
        let Some(adapter) = for_ats(&target.ats) else {
            tracing::warn!(target = %target.name, ats = %target.ats, "unsupported ats; skipping");
            continue;
        };
        match adapter.fetch(target).await {
            Ok(batch) => {
                tracing::info!(target = %target.name, count = batch.len(), "fetched");
                all.extend(batch);
            }
            Err(e) => {
                tracing::warn!(target = %target.name, error = ?e, "source error; continuing");
            }
        }
    }
    all
}
