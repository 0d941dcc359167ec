//! job-scout — one-shot aggregation run.
//! Fetches every configured target, runs the normalize → filter → dedupe
//! pipeline, writes the HTML report, and emails it when SMTP is configured.

use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use job_scout::adapters;
use job_scout::config;
use job_scout::notify::email::EmailSender;
use job_scout::pipeline;
use job_scout::report;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Optional positional arg overrides the config path.
    let mut cfg = match std::env::args().nth(1) {
        Some(path) => config::load_from(&PathBuf::from(path))?,
        None => config::load_default()?,
    };

    let skip_filter = config::skip_filter_enabled();
    if skip_filter {
        tracing::warn!("SKIP_FILTER=1 — report will include all scraped postings");
    }

    let allow = config::split_env_list("ALLOW_LOCATIONS");
    let deny = config::split_env_list("DENY_LOCATIONS");
    if !allow.is_empty() || !deny.is_empty() {
        tracing::info!(?allow, ?deny, "extra location terms active");
        cfg.filter.extend_location_terms(allow, deny);
    }

    let raw = adapters::fetch_all(&cfg.targets).await;
    let run = pipeline::run(raw, &cfg.filter, &cfg.dedupe, skip_filter);

    for (reason, count) in &run.report.reason_counts {
        tracing::debug!(reason = %reason, count, "rejections");
    }
    for ex in &run.report.example_rejections {
        tracing::debug!(
            reason = %ex.reason,
            title = %ex.title,
            company = %ex.company,
            location = %ex.location,
            "example rejection"
        );
    }

    let html = report::write_report(&run.postings, &cfg.output.report_path)?;

    match EmailSender::from_env()? {
        Some(sender) => sender.send_report(html).await?,
        None => tracing::warn!("SMTP settings missing; skipping email delivery"),
    }

    tracing::info!(
        kept = run.postings.len(),
        rejected = run.rejected,
        duplicates = run.duplicates,
        "job-scout run finished"
    );
    Ok(())
}
