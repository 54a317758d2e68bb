//! Single-request page fetcher for the OAI-PMH endpoint.
//!
//! `OaiPageFetcher` performs exactly one request/response cycle per call
//! and reports what happened; retry and backoff policy belong to the
//! harvest loop. The loop is generic over [`FetchPage`] so tests can
//! drive it with scripted responses.

use std::time::Duration;

use retrax_core::{SHARED_RUNTIME, http_client};

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::oai;
use crate::record::RawRecord;

/// Position in the paginated result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// First request: dated query with metadata prefix and set filter
    Initial,
    /// Continuation: opaque server-issued resumption token
    Token(String),
}

/// Result of one fetch cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// A page of records; `next_token` absent means the list is exhausted
    Page {
        records: Vec<RawRecord>,
        next_token: Option<String>,
    },
    /// Flow-control refusal: retry the same request after this many seconds
    RateLimited { retry_after_secs: u64 },
}

/// One paginated request against the remote archive.
pub trait FetchPage {
    fn fetch(&self, cursor: &Cursor) -> Result<PageOutcome, HarvestError>;
}

/// Production fetcher against an OAI-PMH endpoint.
pub struct OaiPageFetcher {
    endpoint: String,
    from_date: String,
    metadata_prefix: String,
    set_spec: String,
    request_timeout: Duration,
}

impl OaiPageFetcher {
    pub fn new(config: &HarvestConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            from_date: config.from_date.clone(),
            metadata_prefix: config.metadata_prefix.clone(),
            set_spec: config.set_spec.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    fn query_params(&self, cursor: &Cursor) -> Vec<(&'static str, String)> {
        match cursor {
            Cursor::Initial => vec![
                ("verb", "ListRecords".to_string()),
                ("from", self.from_date.clone()),
                ("metadataPrefix", self.metadata_prefix.clone()),
                ("set", self.set_spec.clone()),
            ],
            Cursor::Token(token) => vec![
                ("verb", "ListRecords".to_string()),
                ("resumptionToken", token.clone()),
            ],
        }
    }
}

impl FetchPage for OaiPageFetcher {
    fn fetch(&self, cursor: &Cursor) -> Result<PageOutcome, HarvestError> {
        let params = self.query_params(cursor);
        let timeout = self.request_timeout;

        let (status, body) = SHARED_RUNTIME.handle().block_on(async {
            let fut = async {
                let resp = http_client()
                    .get(self.endpoint.as_str())
                    .query(&params)
                    .send()
                    .await
                    .map_err(|e| HarvestError::from_reqwest(&e))?;
                let status = resp.status().as_u16();
                let body = resp
                    .text()
                    .await
                    .map_err(|e| HarvestError::from_reqwest(&e))?;
                Ok::<_, HarvestError>((status, body))
            };
            match tokio::time::timeout(timeout, fut).await {
                Ok(result) => result,
                Err(_) => Err(HarvestError::Transport {
                    status: None,
                    detail: format!("request timed out after {}s", timeout.as_secs()),
                }),
            }
        })?;

        // Flow-control refusals arrive as HTTP 503 with the wait time in
        // the body, so check for the notice before judging the status.
        if let Some(wait) = oai::parse_retry_notice(&body) {
            return wait.map(|retry_after_secs| PageOutcome::RateLimited { retry_after_secs });
        }
        if !(200..300).contains(&status) {
            return Err(HarvestError::Transport {
                status: Some(status),
                detail: "unexpected HTTP status".to_string(),
            });
        }
        oai::parse_list_records(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_query_params() {
        let fetcher = OaiPageFetcher::new(&HarvestConfig::default());
        let params = fetcher.query_params(&Cursor::Initial);
        assert!(params.contains(&("verb", "ListRecords".to_string())));
        assert!(params.contains(&("from", "1991-01-01".to_string())));
        assert!(params.contains(&("metadataPrefix", "arXivRaw".to_string())));
        assert!(params.contains(&("set", "cs".to_string())));
    }

    #[test]
    fn continuation_query_carries_token_only() {
        let fetcher = OaiPageFetcher::new(&HarvestConfig::default());
        let params = fetcher.query_params(&Cursor::Token("abc|123".into()));
        assert_eq!(
            params,
            vec![
                ("verb", "ListRecords".to_string()),
                ("resumptionToken", "abc|123".to_string()),
            ]
        );
    }
}
