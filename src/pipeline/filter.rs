// src/pipeline/filter.rs
//! Keyword/age/location gates plus relevance scoring.
//!
//! Each posting is evaluated gate by gate; the first failing gate is the
//! rejection reason reported in the [`FilterReport`]. Survivors get an
//! additive `score` used only for ordering, never for inclusion. Missing
//! or empty rule lists mean "gate disabled" — misconfiguration degrades to
//! no constraint, it never errors.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::normalize::parse_timestamp;
use crate::posting::Posting;

/// How many rejected records the report keeps as examples.
pub const MAX_REJECTED_EXAMPLES: usize = 3;

// Built-in scoring vocabularies, overridable per config.
const DEFAULT_REMOTE_TERMS: &[&str] = &["remote", "hybrid", "work from home", "anywhere", "distributed"];
const DEFAULT_EMEA_TERMS: &[&str] = &[
    "emea",
    "europe",
    "european",
    "uk",
    "united kingdom",
    "ireland",
    "germany",
    "netherlands",
    "france",
    "spain",
    "italy",
    "portugal",
    "poland",
    "austria",
    "switzerland",
    "sweden",
    "denmark",
    "norway",
    "finland",
];
const DEFAULT_AFFINITY_TERMS: &[&str] = &[
    "data",
    "platform",
    "backend",
    "infrastructure",
    "analytics",
    "machine learning",
];

/// Keyword/age/location rule set, usually the `[filter]` table of the
/// config file. Every field is optional in TOML; absent lists disable the
/// corresponding gate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// Global include keywords (OR: any match suffices).
    pub include: Vec<String>,
    /// Global exclude keywords (OR: any match rejects).
    pub exclude: Vec<String>,
    /// Per-company overrides, merged additively with the global lists.
    /// Lookup is by exact case-insensitive company name.
    pub companies: HashMap<String, CompanyRules>,
    /// Postings strictly older than this many days are rejected. Missing,
    /// unparseable, or future dates are never rejected by age.
    pub max_age_days: Option<i64>,
    /// Whether postings with no location pass the location gate (default true).
    pub allow_unlocated: bool,
    pub location: LocationRules,
    /// Legacy flat alias for `location.include`.
    pub location_allowlist: Vec<String>,
    /// Overrides for the built-in scoring vocabularies.
    pub remote_terms: Vec<String>,
    pub emea_terms: Vec<String>,
    pub affinity_terms: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            companies: HashMap::new(),
            max_age_days: None,
            allow_unlocated: true,
            location: LocationRules::default(),
            location_allowlist: Vec::new(),
            remote_terms: Vec::new(),
            emea_terms: Vec::new(),
            affinity_terms: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompanyRules {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationRules {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl FilterRules {
    fn company_rules(&self, company: &str) -> Option<&CompanyRules> {
        let wanted = company.trim();
        if wanted.is_empty() {
            return None;
        }
        self.companies
            .iter()
            .find(|(name, _)| name.trim().eq_ignore_ascii_case(wanted))
            .map(|(_, rules)| rules)
    }

    /// Global list plus the company override, appended (never replacing).
    fn merged_include<'a>(&'a self, company: &str) -> Vec<&'a str> {
        let mut terms: Vec<&str> = self.include.iter().map(String::as_str).collect();
        if let Some(c) = self.company_rules(company) {
            terms.extend(c.include.iter().map(String::as_str));
        }
        terms
    }

    fn merged_exclude<'a>(&'a self, company: &str) -> Vec<&'a str> {
        let mut terms: Vec<&str> = self.exclude.iter().map(String::as_str).collect();
        if let Some(c) = self.company_rules(company) {
            terms.extend(c.exclude.iter().map(String::as_str));
        }
        terms
    }

    /// `location.include` plus the legacy flat allowlist.
    fn location_allow(&self) -> Vec<&str> {
        let mut terms: Vec<&str> = self.location.include.iter().map(String::as_str).collect();
        terms.extend(self.location_allowlist.iter().map(String::as_str));
        terms
    }

    fn remote_terms(&self) -> Vec<&str> {
        if self.remote_terms.is_empty() {
            DEFAULT_REMOTE_TERMS.to_vec()
        } else {
            self.remote_terms.iter().map(String::as_str).collect()
        }
    }

    fn emea_terms(&self) -> Vec<&str> {
        if self.emea_terms.is_empty() {
            DEFAULT_EMEA_TERMS.to_vec()
        } else {
            self.emea_terms.iter().map(String::as_str).collect()
        }
    }

    fn affinity_terms(&self) -> Vec<&str> {
        if self.affinity_terms.is_empty() {
            DEFAULT_AFFINITY_TERMS.to_vec()
        } else {
            self.affinity_terms.iter().map(String::as_str).collect()
        }
    }

    /// Merge extra allow/deny location terms supplied at the process
    /// boundary (ALLOW_LOCATIONS / DENY_LOCATIONS).
    pub fn extend_location_terms(&mut self, allow: Vec<String>, deny: Vec<String>) {
        self.location.include.extend(allow);
        self.location.exclude.extend(deny);
    }
}

/// First gate a posting failed, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    IncludeMiss,
    ExcludeMatch,
    TooOld,
    LocationBlocked,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::IncludeMiss => "include_miss",
            RejectReason::ExcludeMatch => "exclude_match",
            RejectReason::TooOld => "too_old",
            RejectReason::LocationBlocked => "location_blocked",
        }
    }
}

/// Structured diagnostics for one batch, returned alongside the accepted
/// output instead of being emitted through ambient logging so operators
/// can test it directly.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FilterReport {
    pub reason_counts: BTreeMap<String, usize>,
    pub example_rejections: Vec<RejectedExample>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RejectedExample {
    pub reason: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub posted_at: String,
    pub source: String,
    pub id: Option<String>,
}

impl FilterReport {
    fn record(&mut self, posting: &Posting, reason: RejectReason) {
        *self
            .reason_counts
            .entry(reason.as_str().to_string())
            .or_insert(0) += 1;
        if self.example_rejections.len() < MAX_REJECTED_EXAMPLES {
            self.example_rejections.push(RejectedExample {
                reason: reason.as_str().to_string(),
                title: posting.title_or_empty().to_string(),
                company: posting.company_or_empty().to_string(),
                location: posting.location_or_empty().to_string(),
                posted_at: posting.posted_at_or_empty().to_string(),
                source: posting.source.clone(),
                id: posting.id.clone(),
            });
        }
    }
}

/* ----------------------------
Matching primitives
---------------------------- */

fn keyword_haystack(p: &Posting) -> String {
    format!(
        "{} | {} | {}",
        p.title_or_empty(),
        p.company_or_empty(),
        p.location_or_empty()
    )
    .to_lowercase()
}

/// Case-insensitive substring match; `haystack` must already be lowercase.
fn term_matches(haystack: &str, term: &str) -> bool {
    let t = term.trim().to_lowercase();
    !t.is_empty() && haystack.contains(&t)
}

fn count_matches(haystack: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|t| term_matches(haystack, t)).count()
}

/// Location terms of three or fewer alphabetic characters ("uk", "us")
/// match whole words only, so "uk" does not hit "Ukraine"; longer terms
/// use ordinary substring matching.
fn location_term_matches(location_lc: &str, term: &str) -> bool {
    let t = term.trim().to_lowercase();
    if t.is_empty() {
        return false;
    }
    if t.len() <= 3 && t.chars().all(|c| c.is_ascii_alphabetic()) {
        location_lc
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == t)
    } else {
        location_lc.contains(&t)
    }
}

fn any_location_match(location_lc: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| location_term_matches(location_lc, t))
}

/* ----------------------------
Per-record evaluation
---------------------------- */

enum Verdict {
    Accept(f64),
    Reject(RejectReason),
}

fn passes_age_gate(p: &Posting, rules: &FilterRules, now: DateTime<Utc>) -> bool {
    let Some(max_age_days) = rules.max_age_days else {
        return true;
    };
    let Some(posted) = parse_timestamp(p.posted_at_or_empty()) else {
        // unknown date is never rejected by age
        return true;
    };
    if posted > now {
        // future dates are never rejected by age
        return true;
    }
    (now - posted).num_days() <= max_age_days
}

fn passes_location_gate(p: &Posting, rules: &FilterRules) -> bool {
    if p.is_unlocated() {
        return rules.allow_unlocated;
    }
    let loc = p.location_or_empty().trim().to_lowercase();
    // deny has priority: a matching deny term rejects even if an allow
    // term also matches
    let deny: Vec<&str> = rules.location.exclude.iter().map(String::as_str).collect();
    if any_location_match(&loc, &deny) {
        return false;
    }
    let allow = rules.location_allow();
    allow.is_empty() || any_location_match(&loc, &allow)
}

fn compute_score(p: &Posting, rules: &FilterRules, haystack: &str) -> f64 {
    let mut score = 0.0;
    score += 1.0 * count_matches(haystack, &rules.merged_include(p.company_or_empty())) as f64;
    // Defensive: normally zero because an exclude hit already rejected the
    // record; only relevant when scoring runs independently of gating.
    score -= 0.5 * count_matches(haystack, &rules.merged_exclude(p.company_or_empty())) as f64;

    let loc = p.location_or_empty().trim().to_lowercase();
    if any_location_match(&loc, &rules.remote_terms()) {
        score += 2.0;
    }
    if any_location_match(&loc, &rules.emea_terms()) {
        score += 1.5;
    }

    let title_lc = p.title_or_empty().to_lowercase();
    if rules
        .affinity_terms()
        .iter()
        .any(|t| term_matches(&title_lc, t))
    {
        score += 0.5;
    }

    if !p.posted_at_or_empty().trim().is_empty() {
        score += 0.2;
    }
    score
}

fn evaluate(p: &Posting, rules: &FilterRules, now: DateTime<Utc>) -> Verdict {
    let haystack = keyword_haystack(p);
    let company = p.company_or_empty();

    let include = rules.merged_include(company);
    if !include.is_empty() && count_matches(&haystack, &include) == 0 {
        return Verdict::Reject(RejectReason::IncludeMiss);
    }

    let exclude = rules.merged_exclude(company);
    if count_matches(&haystack, &exclude) > 0 {
        return Verdict::Reject(RejectReason::ExcludeMatch);
    }

    if !passes_age_gate(p, rules, now) {
        return Verdict::Reject(RejectReason::TooOld);
    }

    if !passes_location_gate(p, rules) {
        return Verdict::Reject(RejectReason::LocationBlocked);
    }

    Verdict::Accept(compute_score(p, rules, &haystack))
}

/* ----------------------------
Batch API
---------------------------- */

/// Evaluate a batch against a fixed `now`, returning accepted postings
/// (scored, sorted best-first, ties stable) plus the rejection report.
pub fn filter_with_report_at(
    postings: &[Posting],
    rules: &FilterRules,
    now: DateTime<Utc>,
) -> (Vec<Posting>, FilterReport) {
    let mut report = FilterReport::default();
    let mut accepted = Vec::with_capacity(postings.len());

    for p in postings {
        match evaluate(p, rules, now) {
            Verdict::Accept(score) => {
                let mut kept = p.clone();
                kept.score = Some(score);
                accepted.push(kept);
            }
            Verdict::Reject(reason) => report.record(p, reason),
        }
    }

    // sort_by is stable, so equal scores keep their input order
    accepted.sort_by(|a, b| {
        b.score
            .unwrap_or(0.0)
            .partial_cmp(&a.score.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal)
    });

    (accepted, report)
}

pub fn filter_with_report(postings: &[Posting], rules: &FilterRules) -> (Vec<Posting>, FilterReport) {
    filter_with_report_at(postings, rules, Utc::now())
}

/// Accepted subset only; see [`filter_with_report`] for diagnostics.
pub fn filter(postings: &[Posting], rules: &FilterRules) -> Vec<Posting> {
    filter_with_report(postings, rules).0
}
