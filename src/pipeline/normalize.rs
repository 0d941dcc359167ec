// src/pipeline/normalize.rs
//! Field cleanup and timestamp canonicalization.
//!
//! The normalizer never drops or reorders records: each posting passes
//! through with `title`/`company`/`location`/`url` trimmed and `posted_at`
//! rewritten to a canonical ISO-8601 string when it can be unambiguously
//! parsed. Unparseable timestamps are kept verbatim so the age gate can
//! treat them as "unknown date" rather than an error.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::posting::Posting;

/// Canonical output shape for naive (offset-free) timestamps.
const CANONICAL_NAIVE: &str = "%Y-%m-%dT%H:%M:%S";

// Offset-free layouts seen across ATS feeds. Ambiguous day/month layouts
// like %d/%m/%Y are deliberately not here.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

enum Stamp {
    WithOffset(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

fn parse_stamp(raw: &str) -> Option<Stamp> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(Stamp::WithOffset(dt));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(Stamp::WithOffset(dt));
    }
    for f in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(Stamp::Naive(dt));
        }
    }
    for f in NAIVE_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, f) {
            return Some(Stamp::Naive(d.and_hms_opt(0, 0, 0)?));
        }
    }
    parse_epoch(s)
}

/// Bare epoch seconds (10 digits) or milliseconds (13 digits), as emitted
/// by Lever-style APIs.
fn parse_epoch(s: &str) -> Option<Stamp> {
    if !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: i64 = s.parse().ok()?;
    let dt = match s.len() {
        10 => DateTime::<Utc>::from_timestamp(n, 0)?,
        13 => DateTime::<Utc>::from_timestamp_millis(n)?,
        _ => return None,
    };
    Some(Stamp::WithOffset(dt.fixed_offset()))
}

/// Rewrite an arbitrary textual timestamp into a canonical ISO-8601 string,
/// or `None` when it cannot be unambiguously parsed.
pub fn canonicalize_timestamp(raw: &str) -> Option<String> {
    match parse_stamp(raw)? {
        Stamp::WithOffset(dt) => Some(dt.to_rfc3339()),
        Stamp::Naive(dt) => Some(dt.format(CANONICAL_NAIVE).to_string()),
    }
}

/// Parse a posting date for age comparisons. Naive timestamps are assumed
/// UTC; this is the single definition of "parseable" shared with the
/// filter engine's age gate.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match parse_stamp(raw)? {
        Stamp::WithOffset(dt) => Some(dt.with_timezone(&Utc)),
        Stamp::Naive(dt) => Some(Utc.from_utc_datetime(&dt)),
    }
}

fn trim_field(field: &mut Option<String>) {
    if let Some(s) = field {
        let trimmed = s.trim();
        if trimmed.len() != s.len() {
            *s = trimmed.to_string();
        }
    }
}

/// Normalize a batch in place: same length, same order, no errors.
pub fn normalize(mut postings: Vec<Posting>) -> Vec<Posting> {
    for p in &mut postings {
        trim_field(&mut p.title);
        trim_field(&mut p.company);
        trim_field(&mut p.location);
        trim_field(&mut p.url);
        if let Some(raw) = p.posted_at.as_deref() {
            if let Some(canon) = canonicalize_timestamp(raw) {
                p.posted_at = Some(canon);
            }
        }
    }
    postings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_string_fields() {
        let out = normalize(vec![Posting {
            source: "lever".into(),
            title: Some("  Data Engineer ".into()),
            company: Some(" Acme".into()),
            location: Some("Remote ".into()),
            url: Some(" https://a.example/j ".into()),
            ..Default::default()
        }]);
        assert_eq!(out[0].title.as_deref(), Some("Data Engineer"));
        assert_eq!(out[0].company.as_deref(), Some("Acme"));
        assert_eq!(out[0].location.as_deref(), Some("Remote"));
        assert_eq!(out[0].url.as_deref(), Some("https://a.example/j"));
    }

    #[test]
    fn canonicalizes_common_date_shapes() {
        assert_eq!(
            canonicalize_timestamp("2024-01-01").as_deref(),
            Some("2024-01-01T00:00:00")
        );
        assert_eq!(
            canonicalize_timestamp("January 5, 2024").as_deref(),
            Some("2024-01-05T00:00:00")
        );
        assert_eq!(
            canonicalize_timestamp("Mon, 01 Jan 2024 10:00:00 GMT").as_deref(),
            Some("2024-01-01T10:00:00+00:00")
        );
        // epoch milliseconds (Lever createdAt)
        assert_eq!(
            canonicalize_timestamp("1704067200000").as_deref(),
            Some("2024-01-01T00:00:00+00:00")
        );
    }

    #[test]
    fn rfc3339_offset_is_preserved() {
        let canon = canonicalize_timestamp("2024-06-01T08:30:00+02:00").unwrap();
        assert_eq!(canon, "2024-06-01T08:30:00+02:00");
        // and both forms parse back to the same instant
        let a = parse_timestamp("2024-06-01T08:30:00+02:00").unwrap();
        let b = parse_timestamp(&canon).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unparseable_timestamp_is_kept_verbatim() {
        let out = normalize(vec![Posting {
            source: "rss".into(),
            posted_at: Some("sometime last week".into()),
            ..Default::default()
        }]);
        assert_eq!(out[0].posted_at.as_deref(), Some("sometime last week"));
    }

    #[test]
    fn never_drops_or_reorders() {
        let input: Vec<Posting> = (0..5)
            .map(|i| Posting {
                source: "greenhouse".into(),
                id: Some(i.to_string()),
                ..Default::default()
            })
            .collect();
        let out = normalize(input.clone());
        assert_eq!(out.len(), input.len());
        let ids: Vec<_> = out.iter().map(|p| p.id.clone()).collect();
        let expect: Vec<_> = input.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, expect);
    }

    #[test]
    fn missing_fields_pass_through() {
        let out = normalize(vec![Posting {
            source: "rss".into(),
            ..Default::default()
        }]);
        assert_eq!(out[0].title, None);
        assert_eq!(out[0].posted_at, None);
    }
}
