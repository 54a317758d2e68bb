//! Harvest run configuration.

use std::path::PathBuf;

/// Runtime configuration for one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    /// OAI-PMH endpoint URL
    pub endpoint: String,
    /// Lower datestamp bound of the initial query (YYYY-MM-DD)
    pub from_date: String,
    /// Metadata format to request
    pub metadata_prefix: String,
    /// Set (category) filter
    pub set_spec: String,
    /// Path of the persisted record store
    pub dump_path: PathBuf,
    /// Per-request timeout, covers the full request/response cycle
    pub request_timeout_secs: u64,
    /// Bounded retries for transport failures of a single request
    pub max_transport_retries: u32,
    /// Bail out after this many back-to-back flow-control refusals
    pub max_consecutive_rate_limits: u32,
    /// Persist the store every N fetched pages
    pub checkpoint_every_pages: usize,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://export.arxiv.org/oai2".to_string(),
            from_date: "1991-01-01".to_string(),
            metadata_prefix: "arXivRaw".to_string(),
            set_spec: "cs".to_string(),
            dump_path: PathBuf::from("dump.json"),
            request_timeout_secs: 60,
            max_transport_retries: 3,
            max_consecutive_rate_limits: 25,
            checkpoint_every_pages: 10,
        }
    }
}
