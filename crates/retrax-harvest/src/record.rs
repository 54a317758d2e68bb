//! Wire and store record types.
//!
//! These mirror the `arXivRaw` metadata shape: one record id with an
//! ordered list of version entries. Strings are kept as received; parsing
//! of ordinals and dates happens in the analysis stage, so a harvested
//! dump is never invalidated by a stricter parser.

use serde::{Deserialize, Serialize};

/// One `<version>` element of an `arXivRaw` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Version label as sent by the server, e.g. "v1"
    pub version: String,
    /// Submission datestamp, RFC 2822 (e.g. "Mon, 2 Apr 2001 19:32:27 GMT")
    pub date: String,
    /// Size descriptor, e.g. "352kb"; "0kb" marks a withdrawn version
    pub size: String,
}

/// One harvested record: arXiv id plus its full version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    pub versions: Vec<VersionEntry>,
}

/// One page of records, as returned by a single `ListRecords` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub records: Vec<RawRecord>,
}

impl VersionEntry {
    pub fn new(
        version: impl Into<String>,
        date: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            date: date.into(),
            size: size.into(),
        }
    }
}

impl RawRecord {
    pub fn new(id: impl Into<String>, versions: Vec<VersionEntry>) -> Self {
        Self {
            id: id.into(),
            versions,
        }
    }
}
