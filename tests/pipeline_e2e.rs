// tests/pipeline_e2e.rs
// Full normalize → filter → dedupe runs over small cross-source batches.

use chrono::{Duration, TimeZone, Utc};
use job_scout::pipeline::filter::filter_with_report_at;
use job_scout::pipeline::{self, dedupe, normalize, DedupeOptions, FilterRules};
use job_scout::Posting;

/// Two boards advertise the same Acme role; the lever copy has a trailing
/// space in the title and no date. Exactly one record must survive.
#[test]
fn cross_source_duplicate_collapses_to_one() {
    let raw = vec![
        Posting {
            source: "greenhouse".into(),
            id: Some("1".into()),
            title: Some("Data Engineer".into()),
            company: Some("Acme".into()),
            location: Some("Remote".into()),
            posted_at: Some("2024-01-01".into()),
            ..Default::default()
        },
        Posting {
            source: "lever".into(),
            id: Some("9".into()),
            title: Some("Data Engineer ".into()),
            company: Some("Acme".into()),
            location: Some("Remote".into()),
            ..Default::default()
        },
    ];
    let rules = FilterRules {
        include: vec!["engineer".into()],
        max_age_days: Some(365),
        ..Default::default()
    };
    // pin "now" close to the posting date so the age gate passes
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

    let normalized = normalize(raw);
    // the normalizer canonicalized the bare date
    assert_eq!(
        normalized[0].posted_at.as_deref(),
        Some("2024-01-01T00:00:00")
    );
    assert_eq!(normalized[1].title.as_deref(), Some("Data Engineer"));

    let (scored, report) = filter_with_report_at(&normalized, &rules, now);
    assert_eq!(scored.len(), 2, "both pass keyword/age/location gates");
    assert!(report.reason_counts.is_empty());
    // the dated greenhouse copy ranks first (+0.2 for a known date)
    assert_eq!(scored[0].source, "greenhouse");

    let final_list = dedupe(scored);
    assert_eq!(final_list.len(), 1);
    assert_eq!(final_list[0].source, "greenhouse");
    assert!(final_list[0].score.is_some());
}

#[test]
fn full_run_reports_stage_counts() {
    let now = Utc::now();
    let raw = vec![
        Posting {
            source: "greenhouse".into(),
            id: Some("1".into()),
            title: Some("Platform Engineer".into()),
            company: Some("Acme".into()),
            location: Some("Remote".into()),
            posted_at: Some((now - Duration::days(3)).to_rfc3339()),
            ..Default::default()
        },
        Posting {
            source: "greenhouse".into(),
            id: Some("1".into()),
            title: Some("Platform Engineer".into()),
            company: Some("Acme".into()),
            location: Some("Remote".into()),
            ..Default::default()
        },
        Posting {
            source: "lever".into(),
            id: Some("2".into()),
            title: Some("Talent Sourcer".into()),
            company: Some("Acme".into()),
            location: Some("Remote".into()),
            ..Default::default()
        },
    ];
    let rules = FilterRules {
        include: vec!["engineer".into()],
        max_age_days: Some(30),
        ..Default::default()
    };
    let run = pipeline::run(raw, &rules, &DedupeOptions::default(), false);
    assert_eq!(run.postings.len(), 1);
    assert_eq!(run.rejected, 1);
    assert_eq!(run.duplicates, 1);
    assert_eq!(run.report.reason_counts.get("include_miss"), Some(&1));
    assert_eq!(run.report.example_rejections.len(), 1);
    assert_eq!(run.report.example_rejections[0].title, "Talent Sourcer");
}

/// Re-running the filter over its own output changes nothing: same scores,
/// same order.
#[test]
fn filtering_is_idempotent() {
    let now = Utc::now();
    let rules = FilterRules {
        include: vec!["engineer".into(), "data".into()],
        ..Default::default()
    };
    let raw: Vec<Posting> = [
        ("Data Engineer", "Remote"),
        ("Backend Engineer", "Berlin"),
        ("Data Platform Engineer", "Remote - EMEA"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (title, loc))| Posting {
        source: "greenhouse".into(),
        id: Some(i.to_string()),
        title: Some((*title).into()),
        company: Some("Acme".into()),
        location: Some((*loc).into()),
        ..Default::default()
    })
    .collect();

    let (first, _) = filter_with_report_at(&normalize(raw), &rules, now);
    let (second, _) = filter_with_report_at(&first, &rules, now);
    assert_eq!(first, second);
}
