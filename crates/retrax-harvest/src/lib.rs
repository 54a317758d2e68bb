//! Incremental, resumable OAI-PMH harvester for arXiv metadata.
//!
//! The harvest is a strictly sequential token-chained fetch loop:
//! each `ListRecords` response either carries a page of records plus the
//! next resumption token, or a flow-control notice telling us how long
//! to wait before retrying the same request. Progress is checkpointed to
//! an on-disk [`store::RecordStore`] so an interrupted or aborted run can
//! resume without losing collected pages.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod harvester;
pub mod oai;
pub mod record;
pub mod store;

pub use config::HarvestConfig;
pub use error::HarvestError;
pub use fetcher::{Cursor, FetchPage, OaiPageFetcher, PageOutcome};
pub use harvester::{HarvestOutcome, HarvestSummary, Harvester};
pub use record::{Page, RawRecord, VersionEntry};
pub use store::RecordStore;
