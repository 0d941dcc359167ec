// src/report.rs
//! Renders the final ranked list as a standalone HTML report. The renderer
//! only consumes the Posting shape; it has no say in what survives the
//! pipeline.

use anyhow::{Context, Result};
use html_escape::encode_text;
use std::fs;
use std::path::Path;

use crate::posting::Posting;

pub fn render_html(postings: &[Posting]) -> String {
    let generated_at = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();

    let mut html = String::with_capacity(1024 + postings.len() * 256);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Job Scout — Daily Report</title>\n");
    html.push_str(
        "<style>body{font-family:sans-serif;margin:2em}table{border-collapse:collapse;width:100%}\
         th,td{border:1px solid #ddd;padding:6px;text-align:left}th{background:#f4f4f4}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!(
        "<h1>Job Scout — Daily Report</h1>\n<p>Generated at {} — {} postings</p>\n",
        encode_text(&generated_at),
        postings.len()
    ));
    html.push_str("<table>\n<tr><th>Title</th><th>Company</th><th>Location</th><th>Posted</th><th>Score</th></tr>\n");

    for p in postings {
        let title = encode_text(p.title_or_empty());
        let link = if p.url_or_empty().is_empty() {
            title.to_string()
        } else {
            format!("<a href=\"{}\">{}</a>", encode_text(p.url_or_empty()), title)
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td></tr>\n",
            link,
            encode_text(p.company_or_empty()),
            encode_text(p.location_or_empty()),
            encode_text(p.posted_at_or_empty()),
            p.score.unwrap_or(0.0),
        ));
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

/// Render and write the report, creating parent directories as needed.
/// Returns the HTML so the caller can reuse it for email delivery.
pub fn write_report(postings: &[Posting], path: &Path) -> Result<String> {
    let html = render_html(postings);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating report dir {}", dir.display()))?;
    }
    fs::write(path, &html).with_context(|| format!("writing report to {}", path.display()))?;
    tracing::info!(path = %path.display(), postings = postings.len(), "report written");
    Ok(html)
}
