// src/adapters/greenhouse.rs
//! Greenhouse public boards API (`boards-api.greenhouse.io`). More robust
//! than scraping the embed JSON.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::JobSource;
use crate::config::Target;
use crate::posting::Posting;

#[derive(Debug, Deserialize)]
struct Board {
    #[serde(default)]
    jobs: Vec<BoardJob>,
}

#[derive(Debug, Deserialize)]
struct BoardJob {
    id: Option<u64>,
    title: Option<String>,
    location: Option<BoardLocation>,
    absolute_url: Option<String>,
    updated_at: Option<String>,
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BoardLocation {
    name: Option<String>,
}

pub struct GreenhouseSource {
    client: reqwest::Client,
}

impl GreenhouseSource {
    pub fn new() -> Self {
        Self {
            client: super::http_client(),
        }
    }

    fn parse_board(company: &str, body: &str) -> Result<Vec<Posting>> {
        let board: Board = serde_json::from_str(body).context("parsing greenhouse board json")?;
        Ok(board
            .jobs
            .into_iter()
            .map(|job| Posting {
                source: "greenhouse".into(),
                id: job.id.map(|i| i.to_string()),
                title: job.title,
                company: Some(company.to_string()),
                location: job.location.and_then(|l| l.name),
                url: job.absolute_url,
                posted_at: job.updated_at.or(job.created_at),
                ..Default::default()
            })
            .collect())
    }
}

impl Default for GreenhouseSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobSource for GreenhouseSource {
    async fn fetch(&self, target: &Target) -> Result<Vec<Posting>> {
        let url = format!(
            "https://boards-api.greenhouse.io/v1/boards/{}/jobs",
            target.slug
        );
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .context("greenhouse http get")?
            .error_for_status()
            .context("greenhouse http status")?
            .text()
            .await
            .context("greenhouse http body")?;
        Self::parse_board(&target.name, &body)
    }

    fn name(&self) -> &'static str {
        "greenhouse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "jobs": [
            {
                "id": 400001,
                "title": "Data Engineer",
                "location": { "name": "Remote - EMEA" },
                "absolute_url": "https://boards.greenhouse.io/acme/jobs/400001",
                "updated_at": "2024-02-01T10:00:00-05:00"
            },
            {
                "id": 400002,
                "title": "Backend Engineer",
                "location": null,
                "absolute_url": "https://boards.greenhouse.io/acme/jobs/400002",
                "created_at": "2024-01-15T09:00:00-05:00"
            }
        ]
    }"#;

    #[test]
    fn maps_board_fields() {
        let postings = GreenhouseSource::parse_board("Acme", FIXTURE).unwrap();
        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].source, "greenhouse");
        assert_eq!(postings[0].id.as_deref(), Some("400001"));
        assert_eq!(postings[0].company.as_deref(), Some("Acme"));
        assert_eq!(postings[0].location.as_deref(), Some("Remote - EMEA"));
        // updated_at preferred, created_at as fallback
        assert_eq!(
            postings[0].posted_at.as_deref(),
            Some("2024-02-01T10:00:00-05:00")
        );
        assert_eq!(
            postings[1].posted_at.as_deref(),
            Some("2024-01-15T09:00:00-05:00")
        );
        assert_eq!(postings[1].location, None);
    }

    #[test]
    fn empty_board_is_empty_list() {
        let postings = GreenhouseSource::parse_board("Acme", "{}").unwrap();
        assert!(postings.is_empty());
    }
}
