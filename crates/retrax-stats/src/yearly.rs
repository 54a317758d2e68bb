//! Per-year event counters.

use std::collections::BTreeMap;

use crate::classify::{Action, ClassifiedEvent};

/// Inclusive calendar-year window for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub first: i32,
    pub last: i32,
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            first: 1993,
            last: 2012,
        }
    }
}

impl YearRange {
    pub fn contains(&self, year: i32) -> bool {
        (self.first..=self.last).contains(&year)
    }
}

/// Event counts for one year bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionCounts {
    pub submitted: u64,
    pub updated: u64,
    pub retracted: u64,
}

impl ActionCounts {
    fn record(&mut self, action: Action) {
        match action {
            Action::Submitted => self.submitted += 1,
            Action::Updated => self.updated += 1,
            Action::Retracted => self.retracted += 1,
        }
    }

    /// Retractions per hundred submissions; NaN is the defined sentinel
    /// for years without submissions (never a panic).
    pub fn ratio(&self) -> f64 {
        if self.submitted == 0 {
            f64::NAN
        } else {
            self.retracted as f64 / self.submitted as f64 * 100.0
        }
    }
}

/// One row of the yearly report table.
#[derive(Debug, Clone, PartialEq)]
pub struct YearRow {
    pub year: i32,
    pub submitted: u64,
    pub updated: u64,
    pub retracted: u64,
    pub ratio: f64,
}

/// Year-bucketed counters over a configured range.
///
/// Every year in range has a bucket, zero-filled from the start, so empty
/// years appear in the report as zeros rather than being absent.
#[derive(Debug, Clone)]
pub struct YearlyStats {
    range: YearRange,
    counts: BTreeMap<i32, ActionCounts>,
    out_of_range_events: u64,
}

impl YearlyStats {
    pub fn new(range: YearRange) -> Self {
        let counts = (range.first..=range.last)
            .map(|year| (year, ActionCounts::default()))
            .collect();
        Self {
            range,
            counts,
            out_of_range_events: 0,
        }
    }

    pub fn range(&self) -> YearRange {
        self.range
    }

    pub fn add_event(&mut self, event: &ClassifiedEvent) {
        match self.counts.get_mut(&event.year) {
            Some(bucket) => bucket.record(event.action),
            None => self.out_of_range_events += 1,
        }
    }

    pub fn get(&self, year: i32) -> Option<&ActionCounts> {
        self.counts.get(&year)
    }

    /// Events whose year fell outside the configured range.
    pub fn out_of_range_events(&self) -> u64 {
        self.out_of_range_events
    }

    /// Report rows, ordered by year ascending.
    pub fn rows(&self) -> Vec<YearRow> {
        self.counts
            .iter()
            .map(|(&year, c)| YearRow {
                year,
                submitted: c.submitted,
                updated: c.updated,
                retracted: c.retracted,
                ratio: c.ratio(),
            })
            .collect()
    }
}
