//! End-to-end analysis over small hand-built record sets.

use retrax_harvest::{RawRecord, VersionEntry};
use retrax_stats::{YearRange, analyze};

fn record(id: &str, entries: &[(&str, &str, &str)]) -> RawRecord {
    RawRecord::new(
        id,
        entries
            .iter()
            .map(|(v, d, s)| VersionEntry::new(*v, *d, *s))
            .collect(),
    )
}

#[test]
fn three_record_lifecycle() {
    let records = vec![
        // retracted 9 days after submission
        record(
            "cs/0101001",
            &[("v1", "2001-01-01", "5kb"), ("v2", "2001-01-10", "0kb")],
        ),
        // single version: no retraction or update sample
        record("cs/0505001", &[("v1", "2005-06-01", "3kb")]),
        // updated after 4 days, never retracted
        record(
            "cs/9901001",
            &[("v1", "1999-01-01", "2kb"), ("v2", "1999-01-05", "4kb")],
        ),
    ];

    let report = analyze(
        records.iter(),
        YearRange {
            first: 1999,
            last: 2005,
        },
    );

    let y2001 = report.yearly.get(2001).unwrap();
    assert_eq!(y2001.submitted, 1);
    assert_eq!(y2001.retracted, 1);
    assert_eq!(y2001.updated, 0);

    let y2005 = report.yearly.get(2005).unwrap();
    assert_eq!(y2005.submitted, 1);
    assert_eq!(y2005.updated, 0);
    assert_eq!(y2005.retracted, 0);

    let y1999 = report.yearly.get(1999).unwrap();
    assert_eq!(y1999.submitted, 1);
    assert_eq!(y1999.updated, 1);
    assert_eq!(y1999.retracted, 0);

    // histograms: {9 days: 1} and {4 days: 1}
    assert_eq!(report.lifecycle.retraction_delay.get(9), 1);
    assert_eq!(report.lifecycle.retraction_delay.total(), 1);
    assert_eq!(report.lifecycle.update_delay.get(4), 1);
    assert_eq!(report.lifecycle.update_delay.total(), 1);

    assert_eq!(report.malformed_records, 0);
    assert!(report.lifecycle.anomalies.is_empty());
}

#[test]
fn lone_zero_size_submission_counts_as_submitted() {
    // classification is local to the entry: ordinal 1 beats the zero-size
    // sentinel, so this is a submission, not a retraction event
    let records = vec![record("cs/0203001", &[("v1", "2002-03-01", "0kb")])];

    let report = analyze(
        records.iter(),
        YearRange {
            first: 2002,
            last: 2002,
        },
    );

    let y2002 = report.yearly.get(2002).unwrap();
    assert_eq!(y2002.submitted, 1);
    assert_eq!(y2002.retracted, 0);

    // the whole-record check still sees a withdrawn final state, so the
    // retraction delay histogram gets a zero-day sample
    assert_eq!(report.lifecycle.retraction_delay.get(0), 1);
}
