// src/posting.rs
//! The unit of data flowing through the pipeline.
//!
//! Raw records arrive from adapters with any subset of fields populated, so
//! everything except `source` is optional. Defensive access lives in the
//! narrow `*_or_empty` accessors below instead of null checks scattered
//! across the pipeline stages.

use serde::{Deserialize, Serialize};

/// One job posting. Created by an adapter, rewritten in place by the
/// normalizer, annotated with `score` by the filter engine, and kept or
/// dropped by the deduplicator. Nothing persists beyond one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    /// Origin system identifier, e.g. "greenhouse", "lever", "rss".
    pub source: String,
    /// Origin-scoped unique id. Absent for sources with no stable id
    /// (syndication feeds); such postings always survive exact dedupe.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// Free-text timestamp; canonicalized to ISO-8601 when parseable.
    #[serde(default)]
    pub posted_at: Option<String>,
    #[serde(default)]
    pub description_snippet: Option<String>,
    /// Assigned by the filter engine; not present on input records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Posting {
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn company_or_empty(&self) -> &str {
        self.company.as_deref().unwrap_or("")
    }

    pub fn location_or_empty(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }

    pub fn url_or_empty(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    pub fn posted_at_or_empty(&self) -> &str {
        self.posted_at.as_deref().unwrap_or("")
    }

    /// A blank-after-trim location counts as unlocated, same as an absent one.
    pub fn is_unlocated(&self) -> bool {
        self.location_or_empty().trim().is_empty()
    }
}
