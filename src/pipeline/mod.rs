// src/pipeline/mod.rs
//! The core aggregation pipeline: normalize → filter → dedupe.
//!
//! Purely synchronous and stateless; every stage consumes its full input
//! and produces its full output, so independent runs can execute
//! concurrently without coordination.

pub mod dedupe;
pub mod filter;
pub mod normalize;

pub use dedupe::{dedupe, dedupe_with, DedupeOptions};
pub use filter::{filter, filter_with_report, FilterReport, FilterRules, RejectReason};
pub use normalize::normalize;

use crate::posting::Posting;

/// Outcome of one full pipeline run.
#[derive(Debug)]
pub struct PipelineRun {
    /// Final ranked, deduplicated postings.
    pub postings: Vec<Posting>,
    /// Count rejected by the filter gates.
    pub rejected: usize,
    /// Count removed by exact + fuzzy dedupe.
    pub duplicates: usize,
    /// Per-reason rejection diagnostics (empty when the filter is skipped).
    pub report: FilterReport,
}

/// Run all three stages over a raw batch. `skip_filter` passes every
/// normalized posting straight to dedupe, a debugging toggle for spotting
/// over-aggressive rules.
pub fn run(
    raw: Vec<Posting>,
    rules: &FilterRules,
    opts: &DedupeOptions,
    skip_filter: bool,
) -> PipelineRun {
    let total = raw.len();
    let normalized = normalize(raw);

    let (scored, report) = if skip_filter {
        tracing::debug!(total, "keyword filter skipped; passing all normalized postings");
        (normalized, FilterReport::default())
    } else {
        filter_with_report(&normalized, rules)
    };
    let rejected = total - scored.len();

    let before_dedupe = scored.len();
    let postings = dedupe_with(scored, opts);
    let duplicates = before_dedupe - postings.len();

    tracing::info!(
        total,
        kept = postings.len(),
        rejected,
        duplicates,
        "pipeline run complete"
    );

    PipelineRun {
        postings,
        rejected,
        duplicates,
        report,
    }
}
