//! Lifecycle statistics over a harvested record dump.
//!
//! Pure batch pipeline: normalize raw version histories, classify each
//! version event, bucket by calendar year, and measure time-to-event
//! distributions. Everything here is recomputed from the persisted dump
//! on each run; nothing is written back, so analysis fixes never require
//! re-harvesting.

pub mod classify;
pub mod lifecycle;
pub mod normalize;
pub mod report;
pub mod yearly;

pub use classify::{Action, ClassifiedEvent, classify, classify_record};
pub use lifecycle::{DataQualityError, DurationHistogram, LifecycleStats, is_record_retracted};
pub use normalize::{MalformedRecord, NormalizedRecord, NormalizedVersion, normalize};
pub use report::{AnalysisReport, analyze};
pub use yearly::{ActionCounts, YearRange, YearRow, YearlyStats};
