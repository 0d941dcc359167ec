// src/adapters/rss.rs
//! Career-page RSS feeds. Feeds mix job openings with press releases and
//! blog posts, so entries are kept only when the link path or the title
//! looks job-like, and known newsroom/blog sections are denied outright.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;

use super::JobSource;
use crate::config::Target;
use crate::posting::Posting;

static ALLOW_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)/careers?(/|$)|/jobs?(/|$)|/openings?(/|$)|/join[-_]us(/|$)|/work[-_]with[-_]us(/|$)|/positions?(/|$)|/vacancies?(/|$)|/opportunit(y|ies)(/|$)",
    )
    .expect("allow path regex")
});

static ALLOW_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(hiring|we're hiring|we are hiring)\b|\b(role|position|opening|vacancy|career)\b|\b(engineer|developer|data|ml|ai|product|designer|marketer|analyst|manager|producer|audio)\b|\bintern(ship)?\b",
    )
    .expect("allow title regex")
});

// Common non-job RSS sections, matched against host+path.
const DENY_FRAGMENTS: &[&str] = &[
    "newsroom",
    "press",
    "blog",
    "stories",
    "insights",
    "podcast",
    "updates",
];

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

/// Host+path of a URL, lowercased; good enough for fragment checks
/// without a full URL parser.
fn host_and_path(url: &str) -> String {
    let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    rest[..end].to_lowercase()
}

fn path_of(url: &str) -> String {
    let hp = host_and_path(url);
    match hp.find('/') {
        Some(i) => hp[i..].to_string(),
        None => String::new(),
    }
}

fn looks_like_job(link: &str, title: &str) -> bool {
    if link.is_empty() {
        return false;
    }
    let hp = host_and_path(link);
    if DENY_FRAGMENTS.iter().any(|frag| hp.contains(frag)) {
        return false;
    }
    ALLOW_PATH_RE.is_match(&path_of(link)) || ALLOW_TITLE_RE.is_match(title)
}

pub struct RssSource {
    client: reqwest::Client,
}

impl RssSource {
    pub fn new() -> Self {
        Self {
            client: super::http_client(),
        }
    }

    fn parse_feed(company: &str, xml: &str) -> Result<Vec<Posting>> {
        let rss: Rss = from_str(xml).context("parsing rss xml")?;
        let mut out = Vec::new();
        for item in rss.channel.item {
            let link = item.link.as_deref().unwrap_or("").trim().to_string();
            let title = item.title.as_deref().unwrap_or("").trim().to_string();
            if !looks_like_job(&link, &title) {
                continue;
            }
            out.push(Posting {
                source: "rss".into(),
                // feeds have no stable per-posting id
                id: None,
                title: Some(if title.is_empty() {
                    "(untitled)".to_string()
                } else {
                    title
                }),
                company: Some(company.to_string()),
                // RSS rarely carries structured location
                location: None,
                url: Some(link),
                // raw pubDate; the normalizer canonicalizes RFC 2822
                posted_at: item.pub_date,
                description_snippet: item
                    .description
                    .map(|d| html_escape::decode_html_entities(d.trim()).into_owned()),
                ..Default::default()
            });
        }
        Ok(out)
    }
}

impl Default for RssSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobSource for RssSource {
    async fn fetch(&self, target: &Target) -> Result<Vec<Posting>> {
        let mut out = Vec::new();
        for feed_url in &target.rss_feeds {
            let body = match self.client.get(feed_url).send().await {
                Ok(resp) => resp.text().await.context("rss http body")?,
                Err(e) => {
                    // one dead feed must not sink the others
                    tracing::warn!(feed = %feed_url, error = ?e, "rss fetch error");
                    continue;
                }
            };
            match Self::parse_feed(&target.name, &body) {
                Ok(mut batch) => out.append(&mut batch),
                Err(e) => tracing::warn!(feed = %feed_url, error = ?e, "rss parse error"),
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "rss"
    }
}
