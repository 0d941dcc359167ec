// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod adapters;
pub mod config;
pub mod notify;
pub mod pipeline;
pub mod posting;
pub mod report;

// ---- Re-exports for stable public API ----
pub use crate::pipeline::{dedupe, filter, filter_with_report, normalize};
pub use crate::pipeline::{DedupeOptions, FilterReport, FilterRules, PipelineRun};
pub use crate::posting::Posting;
