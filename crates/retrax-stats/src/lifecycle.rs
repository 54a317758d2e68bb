//! Time-to-event measurements per record.
//!
//! Distinct from per-entry classification: a record counts as retracted
//! here only when its *last* known version is zero-size, i.e. the record's
//! final state is withdrawn. Records that never reach the relevant
//! terminal event contribute no sample (absent, not zero).

use std::collections::BTreeMap;

use crate::classify::is_zero_size;
use crate::normalize::NormalizedRecord;

/// Sample excluded from a histogram for data-quality reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataQualityError {
    /// Event date precedes the submission date
    NegativeDuration {
        record_id: String,
        days: i64,
    },
}

impl std::fmt::Display for DataQualityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeDuration { record_id, days } => {
                write!(f, "{record_id}: negative duration of {days} days")
            }
        }
    }
}

impl std::error::Error for DataQualityError {}

/// Whether the record's last known state is withdrawn.
pub fn is_record_retracted(record: &NormalizedRecord) -> bool {
    record
        .versions
        .last()
        .is_some_and(|v| is_zero_size(&v.size))
}

/// Whole days from submission (ordinal 1) to the final entry, if and only
/// if that final entry is zero-size. `Some(Err(..))` flags a negative
/// duration as a data-quality anomaly instead of including it.
pub fn time_to_retraction(record: &NormalizedRecord) -> Option<Result<i64, DataQualityError>> {
    if !is_record_retracted(record) {
        return None;
    }
    let start = record.versions.first()?.date;
    let last = record.versions.last()?.date;
    Some(checked_days(&record.id, last.signed_duration_since(start).num_days()))
}

/// Whole days from submission to the ordinal-2 entry, when one exists.
pub fn time_to_first_update(record: &NormalizedRecord) -> Option<Result<i64, DataQualityError>> {
    if record.versions.len() < 2 {
        return None;
    }
    let start = record.versions[0].date;
    let update = record.versions[1].date;
    Some(checked_days(
        &record.id,
        update.signed_duration_since(start).num_days(),
    ))
}

fn checked_days(record_id: &str, days: i64) -> Result<i64, DataQualityError> {
    if days < 0 {
        Err(DataQualityError::NegativeDuration {
            record_id: record_id.to_string(),
            days,
        })
    } else {
        Ok(days)
    }
}

/// Day-count frequency distribution. Keys are never negative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DurationHistogram(BTreeMap<i64, u64>);

impl DurationHistogram {
    fn add(&mut self, days: i64) {
        *self.0.entry(days).or_insert(0) += 1;
    }

    pub fn get(&self, days: i64) -> u64 {
        self.0.get(&days).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.0.iter().map(|(&d, &c)| (d, c))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of samples.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

/// Duration distributions plus the anomalies excluded from them.
#[derive(Debug, Clone, Default)]
pub struct LifecycleStats {
    pub retraction_delay: DurationHistogram,
    pub update_delay: DurationHistogram,
    pub anomalies: Vec<DataQualityError>,
}

impl LifecycleStats {
    pub fn add_record(&mut self, record: &NormalizedRecord) {
        if let Some(sample) = time_to_retraction(record) {
            match sample {
                Ok(days) => self.retraction_delay.add(days),
                Err(e) => self.anomalies.push(e),
            }
        }
        if let Some(sample) = time_to_first_update(record) {
            match sample {
                Ok(days) => self.update_delay.add(days),
                Err(e) => self.anomalies.push(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use retrax_harvest::{RawRecord, VersionEntry};

    fn record(entries: &[(&str, &str, &str)]) -> NormalizedRecord {
        let raw = RawRecord::new(
            "cs/0101001",
            entries
                .iter()
                .map(|(v, d, s)| VersionEntry::new(*v, *d, *s))
                .collect(),
        );
        normalize(&raw).unwrap()
    }

    #[test]
    fn retraction_delay_in_whole_days() {
        let rec = record(&[("v1", "2001-01-01", "5kb"), ("v2", "2001-01-10", "0kb")]);
        assert!(is_record_retracted(&rec));
        assert_eq!(time_to_retraction(&rec), Some(Ok(9)));
    }

    #[test]
    fn non_retracted_final_entry_means_no_sample() {
        let rec = record(&[("v1", "1999-01-01", "2kb"), ("v2", "1999-01-05", "4kb")]);
        assert!(!is_record_retracted(&rec));
        assert_eq!(time_to_retraction(&rec), None);
        assert_eq!(time_to_first_update(&rec), Some(Ok(4)));
    }

    #[test]
    fn single_version_contributes_no_samples() {
        let rec = record(&[("v1", "2005-06-01", "3kb")]);
        assert_eq!(time_to_retraction(&rec), None);
        assert_eq!(time_to_first_update(&rec), None);
    }

    #[test]
    fn mid_sequence_retraction_does_not_mark_record() {
        // zero-size v2 superseded by a larger v3: last state is not withdrawn
        let rec = record(&[
            ("v1", "2001-01-01", "5kb"),
            ("v2", "2001-01-10", "0kb"),
            ("v3", "2001-02-01", "9kb"),
        ]);
        assert!(!is_record_retracted(&rec));
        assert_eq!(time_to_retraction(&rec), None);
    }

    #[test]
    fn negative_duration_is_an_anomaly_not_a_sample() {
        let rec = record(&[("v1", "2001-02-01", "5kb"), ("v2", "2001-01-01", "0kb")]);
        let mut stats = LifecycleStats::default();
        stats.add_record(&rec);
        assert!(stats.retraction_delay.is_empty());
        assert!(stats.update_delay.is_empty());
        // one anomaly per would-be sample (retraction and first update)
        assert_eq!(stats.anomalies.len(), 2);
        assert!(matches!(
            stats.anomalies[0],
            DataQualityError::NegativeDuration { days: -31, .. }
        ));
    }

    #[test]
    fn histogram_counts_exact_durations() {
        let mut stats = LifecycleStats::default();
        stats.add_record(&record(&[
            ("v1", "2001-01-01", "5kb"),
            ("v2", "2001-01-10", "0kb"),
        ]));
        stats.add_record(&record(&[
            ("v1", "2002-03-01", "5kb"),
            ("v2", "2002-03-10", "0kb"),
        ]));
        assert_eq!(stats.retraction_delay.get(9), 2);
        assert_eq!(stats.retraction_delay.total(), 2);
        assert!(stats.retraction_delay.iter().all(|(days, _)| days >= 0));
    }

    #[test]
    fn same_day_retraction_is_zero_days() {
        let rec = record(&[("v1", "2001-01-01", "5kb"), ("v2", "2001-01-01", "0kb")]);
        assert_eq!(time_to_retraction(&rec), Some(Ok(0)));
    }
}
