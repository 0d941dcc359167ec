// src/adapters/lever.rs
//! Lever postings API (`api.lever.co/v0/postings/<slug>?mode=json`).

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use super::JobSource;
use crate::config::Target;
use crate::posting::Posting;

const SNIPPET_MAX_CHARS: usize = 240;

#[derive(Debug, Deserialize)]
struct LeverPosting {
    id: Option<String>,
    text: Option<String>,
    #[serde(rename = "createdAt")]
    created_at: Option<i64>,
    categories: Option<Categories>,
    #[serde(rename = "hostedUrl")]
    hosted_url: Option<String>,
    #[serde(rename = "applyUrl")]
    apply_url: Option<String>,
    #[serde(default)]
    lists: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Categories {
    location: Option<String>,
    team: Option<String>,
    department: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Section {
    text: Option<String>,
}

pub struct LeverSource {
    client: reqwest::Client,
}

impl LeverSource {
    pub fn new() -> Self {
        Self {
            client: super::http_client(),
        }
    }

    fn parse_postings(company: &str, body: &str) -> Result<Vec<Posting>> {
        let raw: Vec<LeverPosting> = serde_json::from_str(body).context("parsing lever json")?;
        Ok(raw
            .into_iter()
            .map(|job| {
                let cats = job.categories;
                let (location, team, department) = match cats {
                    Some(c) => (c.location, c.department, c.team),
                    None => (None, None, None),
                };
                Posting {
                    source: "lever".into(),
                    id: job.id,
                    title: job.text,
                    company: Some(company.to_string()),
                    location,
                    // Lever nests "team" under department and vice versa
                    department,
                    team,
                    url: job.hosted_url.or(job.apply_url),
                    posted_at: job.created_at.and_then(epoch_millis_to_iso),
                    description_snippet: job
                        .lists
                        .first()
                        .and_then(|s| s.text.as_deref())
                        .map(truncate_snippet),
                    ..Default::default()
                }
            })
            .collect())
    }
}

impl Default for LeverSource {
    fn default() -> Self {
        Self::new()
    }
}

fn epoch_millis_to_iso(ms: i64) -> Option<String> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.to_rfc3339())
}

fn truncate_snippet(s: &str) -> String {
    s.chars().take(SNIPPET_MAX_CHARS).collect()
}

#[async_trait]
impl JobSource for LeverSource {
    async fn fetch(&self, target: &Target) -> Result<Vec<Posting>> {
        let url = format!("https://api.lever.co/v0/postings/{}?mode=json", target.slug);
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .context("lever http get")?
            .error_for_status()
            .context("lever http status")?
            .text()
            .await
            .context("lever http body")?;
        Self::parse_postings(&target.name, &body)
    }

    fn name(&self) -> &'static str {
        "lever"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"[
        {
            "id": "abc-123",
            "text": "Senior Data Engineer",
            "createdAt": 1704067200000,
            "categories": { "location": "Remote", "team": "Data", "department": "Engineering" },
            "hostedUrl": "https://jobs.lever.co/acme/abc-123",
            "lists": [ { "text": "Build pipelines." } ]
        },
        {
            "text": "Untitled role"
        }
    ]"#;

    #[test]
    fn maps_lever_fields() {
        let postings = LeverSource::parse_postings("Acme", FIXTURE).unwrap();
        assert_eq!(postings.len(), 2);
        let p = &postings[0];
        assert_eq!(p.source, "lever");
        assert_eq!(p.id.as_deref(), Some("abc-123"));
        assert_eq!(p.title.as_deref(), Some("Senior Data Engineer"));
        assert_eq!(p.location.as_deref(), Some("Remote"));
        assert_eq!(p.posted_at.as_deref(), Some("2024-01-01T00:00:00+00:00"));
        assert_eq!(p.description_snippet.as_deref(), Some("Build pipelines."));
        // sparse records still come through with fields defaulted
        assert_eq!(postings[1].id, None);
        assert_eq!(postings[1].posted_at, None);
    }

    #[test]
    fn snippet_is_capped() {
        let long = "x".repeat(1000);
        assert_eq!(truncate_snippet(&long).chars().count(), SNIPPET_MAX_CHARS);
    }
}
