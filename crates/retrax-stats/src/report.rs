//! Analysis driver and report rendering.
//!
//! `analyze` runs the full batch pipeline over a merged record snapshot
//! and always produces a complete report for the configured year range;
//! malformed records and data-quality anomalies are skipped and counted,
//! never fatal.

use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use retrax_harvest::RawRecord;

use crate::classify::classify_record;
use crate::lifecycle::{DurationHistogram, LifecycleStats};
use crate::normalize::normalize;
use crate::yearly::{YearRange, YearlyStats};

/// Full analysis output for one run.
#[derive(Debug)]
pub struct AnalysisReport {
    pub yearly: YearlyStats,
    pub lifecycle: LifecycleStats,
    pub total_records: usize,
    /// Records rejected by normalization and excluded entirely
    pub malformed_records: usize,
}

/// Run the batch pipeline over a record snapshot.
pub fn analyze<'a, I>(records: I, range: YearRange) -> AnalysisReport
where
    I: IntoIterator<Item = &'a RawRecord>,
{
    let mut yearly = YearlyStats::new(range);
    let mut lifecycle = LifecycleStats::default();
    let mut total_records = 0usize;
    let mut malformed_records = 0usize;

    for raw in records {
        total_records += 1;
        let record = match normalize(raw) {
            Ok(record) => record,
            Err(e) => {
                malformed_records += 1;
                log::debug!("skipping {}: {e}", raw.id);
                continue;
            }
        };
        for event in classify_record(&record) {
            yearly.add_event(&event);
        }
        lifecycle.add_record(&record);
    }

    AnalysisReport {
        yearly,
        lifecycle,
        total_records,
        malformed_records,
    }
}

fn fmt_ratio(ratio: f64) -> String {
    if ratio.is_nan() {
        "n/a".to_string()
    } else {
        format!("{ratio:.2}%")
    }
}

impl AnalysisReport {
    /// Format the per-year table as a string.
    pub fn format_year_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Year").fg(Color::Cyan),
                Cell::new("Submitted").fg(Color::Cyan),
                Cell::new("Updated").fg(Color::Cyan),
                Cell::new("Retracted").fg(Color::Cyan),
                Cell::new("Retracted/Submitted").fg(Color::Cyan),
            ]);
        for row in self.yearly.rows() {
            table.add_row(vec![
                Cell::new(row.year),
                Cell::new(row.submitted),
                Cell::new(row.updated),
                Cell::new(row.retracted),
                Cell::new(fmt_ratio(row.ratio)),
            ]);
        }
        format!("{table}")
    }

    /// Format one duration histogram as a (days, count) table.
    pub fn format_histogram(title: &str, hist: &DurationHistogram) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new(title).fg(Color::Cyan),
                Cell::new("Records").fg(Color::Cyan),
            ]);
        if hist.is_empty() {
            table.add_row(vec![Cell::new("-"), Cell::new("0")]);
        }
        for (days, count) in hist.iter() {
            table.add_row(vec![Cell::new(format!("{days} d")), Cell::new(count)]);
        }
        format!("{table}")
    }

    /// Print the full report to stdout (TTY mode).
    pub fn print(&self) {
        println!("{}", self.format_year_table());
        println!(
            "{}",
            Self::format_histogram("Days to retraction", &self.lifecycle.retraction_delay)
        );
        println!(
            "{}",
            Self::format_histogram("Days to first update", &self.lifecycle.update_delay)
        );
        self.log_quality();
    }

    /// Log a minimal summary (non-TTY mode).
    pub fn log(&self) {
        for row in self.yearly.rows() {
            log::info!(
                "{}: submitted={} updated={} retracted={} ratio={}",
                row.year,
                row.submitted,
                row.updated,
                row.retracted,
                fmt_ratio(row.ratio)
            );
        }
        log::info!(
            "retraction delays: {} samples; update delays: {} samples",
            self.lifecycle.retraction_delay.total(),
            self.lifecycle.update_delay.total()
        );
        self.log_quality();
    }

    fn log_quality(&self) {
        log::info!(
            "{} records analyzed, {} malformed skipped, {} out-of-range events, {} quality anomalies",
            self.total_records,
            self.malformed_records,
            self.yearly.out_of_range_events(),
            self.lifecycle.anomalies.len()
        );
        for anomaly in &self.lifecycle.anomalies {
            log::warn!("excluded sample: {anomaly}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrax_harvest::VersionEntry;

    #[test]
    fn malformed_records_are_skipped_and_counted() {
        let records = vec![
            RawRecord::new("good", vec![VersionEntry::new("v1", "2001-01-01", "5kb")]),
            RawRecord::new("empty", vec![]),
            RawRecord::new(
                "bad-date",
                vec![VersionEntry::new("v1", "whenever", "5kb")],
            ),
        ];
        let report = analyze(records.iter(), YearRange::default());
        assert_eq!(report.total_records, 3);
        assert_eq!(report.malformed_records, 2);
        assert_eq!(report.yearly.get(2001).unwrap().submitted, 1);
    }

    #[test]
    fn ratio_renders_sentinel_for_empty_years() {
        assert_eq!(fmt_ratio(f64::NAN), "n/a");
        assert_eq!(fmt_ratio(25.0), "25.00%");
    }

    #[test]
    fn year_table_has_one_row_per_year() {
        let report = analyze(
            std::iter::empty::<&RawRecord>(),
            YearRange {
                first: 2000,
                last: 2004,
            },
        );
        let rendered = report.format_year_table();
        for year in 2000..=2004 {
            assert!(rendered.contains(&year.to_string()));
        }
    }
}
