//! Normalization of raw version histories.
//!
//! Turns the string-typed wire entries into parsed, ordinal-ordered
//! sequences. Real-world dumps contain anomalies, so failures are
//! per-record: callers skip-and-count rather than abort.

use chrono::{DateTime, NaiveDate};
use retrax_harvest::RawRecord;

/// Parsed version entry, ordered by ordinal within its record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedVersion {
    /// 1-based version sequence number (1 = first submission)
    pub ordinal: u32,
    pub date: NaiveDate,
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub id: String,
    /// Ordered by ordinal ascending, guaranteed contiguous from 1
    pub versions: Vec<NormalizedVersion>,
}

/// Why a record was rejected by normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedRecord {
    EmptyVersions,
    BadOrdinal { raw: String },
    /// Sorted ordinals are not exactly 1..=n (gap or duplicate)
    NonContiguousOrdinals { ordinals: Vec<u32> },
    BadDate { raw: String },
}

impl std::fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyVersions => write!(f, "record has no versions"),
            Self::BadOrdinal { raw } => write!(f, "unparsable version ordinal {raw:?}"),
            Self::NonContiguousOrdinals { ordinals } => {
                write!(f, "version ordinals not contiguous from 1: {ordinals:?}")
            }
            Self::BadDate { raw } => write!(f, "unparsable version date {raw:?}"),
        }
    }
}

impl std::error::Error for MalformedRecord {}

/// Flatten a raw record into its ordinal-ordered version sequence.
pub fn normalize(raw: &RawRecord) -> Result<NormalizedRecord, MalformedRecord> {
    if raw.versions.is_empty() {
        return Err(MalformedRecord::EmptyVersions);
    }

    let mut versions = Vec::with_capacity(raw.versions.len());
    for entry in &raw.versions {
        let ordinal = parse_ordinal(&entry.version).ok_or_else(|| MalformedRecord::BadOrdinal {
            raw: entry.version.clone(),
        })?;
        let date = parse_date(&entry.date).ok_or_else(|| MalformedRecord::BadDate {
            raw: entry.date.clone(),
        })?;
        versions.push(NormalizedVersion {
            ordinal,
            date,
            size: entry.size.trim().to_string(),
        });
    }

    versions.sort_by_key(|v| v.ordinal);
    let ordinals: Vec<u32> = versions.iter().map(|v| v.ordinal).collect();
    let contiguous = ordinals
        .iter()
        .enumerate()
        .all(|(i, &o)| o == i as u32 + 1);
    if !contiguous {
        return Err(MalformedRecord::NonContiguousOrdinals { ordinals });
    }

    Ok(NormalizedRecord {
        id: raw.id.clone(),
        versions,
    })
}

/// Parse a version label like "v3" (or bare "3") into its ordinal.
fn parse_ordinal(label: &str) -> Option<u32> {
    let trimmed = label.trim();
    let digits = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed);
    digits.parse().ok().filter(|&n| n > 0)
}

/// Parse an arXivRaw datestamp (RFC 2822) or a plain ISO date.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}
