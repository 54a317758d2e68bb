//! Per-entry event classification.
//!
//! Classification is a pure function of (ordinal, size descriptor) and is
//! deliberately local: it never looks ahead or behind within the record.
//! An ordinal-1 entry is always a submission, even when zero-size, and a
//! non-final zero-size entry is still called retracted even if a later,
//! larger version supersedes it. The whole-record retraction check with
//! last-entry semantics lives in [`crate::lifecycle::is_record_retracted`];
//! the two are distinct on purpose.

use crate::normalize::{NormalizedRecord, NormalizedVersion};

/// Zero-size marker used by the archive for withdrawn versions.
const ZERO_SIZE_SENTINEL: &str = "0kb";

/// Lifecycle action of one version event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Submitted,
    Updated,
    Retracted,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Submitted => "submitted",
            Self::Updated => "updated",
            Self::Retracted => "retracted",
        })
    }
}

/// One classified version event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub record_id: String,
    pub year: i32,
    pub action: Action,
}

/// Whether a size descriptor is the zero-size retraction sentinel.
pub fn is_zero_size(size: &str) -> bool {
    size.trim().eq_ignore_ascii_case(ZERO_SIZE_SENTINEL)
}

/// Classify one version entry by ordinal and size.
pub fn classify(ordinal: u32, size: &str) -> Action {
    if ordinal == 1 {
        Action::Submitted
    } else if is_zero_size(size) {
        Action::Retracted
    } else {
        Action::Updated
    }
}

fn classify_version(v: &NormalizedVersion) -> Action {
    classify(v.ordinal, &v.size)
}

/// Classify every version event of a normalized record.
pub fn classify_record(record: &NormalizedRecord) -> Vec<ClassifiedEvent> {
    record
        .versions
        .iter()
        .map(|v| ClassifiedEvent {
            record_id: record.id.clone(),
            year: chrono::Datelike::year(&v.date),
            action: classify_version(v),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinal_one_is_submitted() {
        assert_eq!(classify(1, "5kb"), Action::Submitted);
    }

    #[test]
    fn zero_size_is_retracted() {
        assert_eq!(classify(2, "0kb"), Action::Retracted);
        assert_eq!(classify(3, " 0KB "), Action::Retracted);
    }

    #[test]
    fn nonzero_later_version_is_updated() {
        assert_eq!(classify(2, "8kb"), Action::Updated);
        assert_eq!(classify(7, "120kb"), Action::Updated);
    }

    #[test]
    fn single_zero_size_submission_is_submitted_not_retracted() {
        // local classification: ordinal 1 wins over the zero-size sentinel
        assert_eq!(classify(1, "0kb"), Action::Submitted);
    }

    #[test]
    fn classification_is_pure() {
        for _ in 0..2 {
            assert_eq!(classify(2, "0kb"), Action::Retracted);
            assert_eq!(classify(1, "0kb"), Action::Submitted);
        }
    }

    #[test]
    fn zero_size_detection() {
        assert!(is_zero_size("0kb"));
        assert!(is_zero_size("0KB"));
        assert!(!is_zero_size("10kb"));
        assert!(!is_zero_size(""));
    }
}
