// src/pipeline/dedupe.rs
//! Two-stage duplicate removal over an already-ranked batch.
//!
//! Stage 1 drops repeats of an exact `(source, id)` key; postings with no
//! id always survive, trading precision for recall when a source has no
//! stable identifier. Stage 2 scans each survivor against the accepted set
//! and drops it when company and location match exactly and the titles are
//! near-identical.
//!
//! Similarity metric: the better of a plain and a token-sorted
//! `strsim::normalized_levenshtein` ratio, scaled to 0–100, so reordered
//! titles ("Backend Engineer, Senior" vs "Senior Backend Engineer") still
//! compare as near-identical. The 92.0 threshold is tunable policy, not a
//! correctness requirement.

use std::collections::HashSet;

use serde::Deserialize;
use strsim::normalized_levenshtein;

use crate::posting::Posting;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 92.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupeOptions {
    /// Minimum title similarity (0–100) for two postings with equal
    /// company and location to count as duplicates.
    pub similarity_threshold: f64,
}

impl Default for DedupeOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Lowercase and strip punctuation so similarity compares words, not
/// formatting.
fn normalize_title(s: &str) -> String {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn token_sort(normalized: &str) -> String {
    let mut tokens: Vec<&str> = normalized.split(' ').collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token-order-insensitive title similarity on a 0–100 scale.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a_norm = normalize_title(a);
    let b_norm = normalize_title(b);
    let plain = normalized_levenshtein(&a_norm, &b_norm);
    let sorted = normalized_levenshtein(&token_sort(&a_norm), &token_sort(&b_norm));
    plain.max(sorted) * 100.0
}

fn is_fuzzy_duplicate(candidate: &Posting, kept: &Posting, threshold: f64) -> bool {
    kept.company_or_empty() == candidate.company_or_empty()
        && kept.location_or_empty() == candidate.location_or_empty()
        && title_similarity(candidate.title_or_empty(), kept.title_or_empty()) >= threshold
}

/// Remove duplicates, preserving the first-seen representative of each
/// group and the relative order of survivors.
pub fn dedupe_with(postings: Vec<Posting>, opts: &DedupeOptions) -> Vec<Posting> {
    // Stage 1: exact (source, id) key. A missing id never deduplicates.
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut unique = Vec::with_capacity(postings.len());
    for p in postings {
        if let Some(id) = p.id.as_deref() {
            if !seen.insert((p.source.clone(), id.to_string())) {
                continue;
            }
        }
        unique.push(p);
    }

    // Stage 2: fuzzy scan against the growing accepted set. O(n²) on the
    // company/location-equal subset, fine at realistic batch sizes.
    let mut out: Vec<Posting> = Vec::with_capacity(unique.len());
    for candidate in unique {
        let duplicate = out
            .iter()
            .any(|kept| is_fuzzy_duplicate(&candidate, kept, opts.similarity_threshold));
        if !duplicate {
            out.push(candidate);
        }
    }
    out
}

pub fn dedupe(postings: Vec<Posting>) -> Vec<Posting> {
    dedupe_with(postings, &DedupeOptions::default())
}
