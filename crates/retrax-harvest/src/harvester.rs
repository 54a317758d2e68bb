//! Harvest loop: drives the page fetcher, accumulates pages, checkpoints.
//!
//! Requests are strictly sequential; each depends on the token from the
//! previous response. The loop owns all retry policy: bounded exponential
//! backoff for transport failures, server-directed waits for flow-control
//! refusals (retrying the *same* request), and a hard bound on consecutive
//! refusals. Every exit route (completion, protocol abort, transport
//! exhaustion, interrupt) persists the store before returning, so partial
//! progress is never discarded.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use retrax_core::ShutdownFlag;

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::fetcher::{Cursor, FetchPage, PageOutcome};
use crate::record::Page;
use crate::store::RecordStore;

/// Hard cap on a server-directed wait; larger values are treated as absurd.
const MAX_RETRY_WAIT_SECS: u64 = 600;
/// Substitute for absurd (zero or over-cap) server-directed waits.
const DEFAULT_RETRY_WAIT_SECS: u64 = 30;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarvestOutcome {
    /// Reached the end of the paginated list
    Completed,
    /// Stopped early on a shutdown request; the dump is marked partial
    Interrupted,
}

/// Counters for one harvest run.
#[derive(Debug)]
pub struct HarvestSummary {
    pub outcome: HarvestOutcome,
    pub pages_fetched: usize,
    pub records_fetched: usize,
    pub transport_retries: u32,
    /// Seconds served for each flow-control wait, in order
    pub rate_limit_waits: Vec<u64>,
    pub elapsed: Duration,
}

impl HarvestSummary {
    pub fn log(&self) {
        log::info!(
            "harvest {}: {} pages, {} records, {} transport retries, {} rate-limit waits, {:.1}s",
            match self.outcome {
                HarvestOutcome::Completed => "complete",
                HarvestOutcome::Interrupted => "interrupted",
            },
            self.pages_fetched,
            self.records_fetched,
            self.transport_retries,
            self.rate_limit_waits.len(),
            self.elapsed.as_secs_f64()
        );
    }
}

pub struct Harvester {
    config: HarvestConfig,
}

impl Harvester {
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Run the harvest to completion, interruption, or failure.
    ///
    /// The store is persisted on every return path; on `Err` the dump is
    /// marked partial first so a later run can resume from the checkpoint.
    pub fn run(
        &self,
        fetcher: &impl FetchPage,
        store: &mut RecordStore,
        shutdown: &ShutdownFlag,
    ) -> Result<HarvestSummary> {
        let start = Instant::now();
        let mut summary = HarvestSummary {
            outcome: HarvestOutcome::Completed,
            pages_fetched: 0,
            records_fetched: 0,
            transport_retries: 0,
            rate_limit_waits: Vec::new(),
            elapsed: Duration::ZERO,
        };

        let result = self.drive(fetcher, store, shutdown, &mut summary);

        // single guaranteed checkpoint on every exit route
        if !store.is_complete() {
            store.mark_partial();
        }
        store
            .save(&self.config.dump_path)
            .with_context(|| format!("failed to checkpoint {}", self.config.dump_path.display()))?;
        log::info!(
            "checkpointed {} ({} pages, {} records)",
            self.config.dump_path.display(),
            store.page_count(),
            store.record_count()
        );

        summary.elapsed = start.elapsed();
        match result {
            Ok(outcome) => {
                summary.outcome = outcome;
                Ok(summary)
            }
            Err(e) => {
                Err(anyhow::Error::from(e).context("harvest aborted (partial dump checkpointed)"))
            }
        }
    }

    fn drive(
        &self,
        fetcher: &impl FetchPage,
        store: &mut RecordStore,
        shutdown: &ShutdownFlag,
        summary: &mut HarvestSummary,
    ) -> Result<HarvestOutcome, HarvestError> {
        let Some(mut cursor) = store.resume_cursor() else {
            log::info!("dump already complete, nothing to fetch");
            return Ok(HarvestOutcome::Completed);
        };
        if let Cursor::Token(token) = &cursor {
            log::info!("resuming from token {token}");
        }

        let mut consecutive_rate_limits: u32 = 0;
        loop {
            if shutdown.is_requested() {
                log::warn!("shutdown requested, stopping harvest");
                return Ok(HarvestOutcome::Interrupted);
            }

            match self.fetch_with_retry(fetcher, &cursor, shutdown, summary)? {
                None => return Ok(HarvestOutcome::Interrupted),
                Some(PageOutcome::RateLimited { retry_after_secs }) => {
                    consecutive_rate_limits += 1;
                    if consecutive_rate_limits > self.config.max_consecutive_rate_limits {
                        return Err(HarvestError::protocol(format!(
                            "endpoint refused {consecutive_rate_limits} consecutive requests"
                        )));
                    }
                    let wait = clamp_retry_wait(retry_after_secs);
                    log::warn!("rate limited, waiting {wait}s before retrying the same request");
                    summary.rate_limit_waits.push(wait);
                    if !interruptible_sleep(Duration::from_secs(wait), shutdown) {
                        return Ok(HarvestOutcome::Interrupted);
                    }
                    // cursor unchanged: retry the identical request
                }
                Some(PageOutcome::Page {
                    records,
                    next_token,
                }) => {
                    consecutive_rate_limits = 0;
                    summary.pages_fetched += 1;
                    summary.records_fetched += records.len();
                    log::info!(
                        "page {}: {} records, next token {}",
                        summary.pages_fetched,
                        records.len(),
                        next_token.as_deref().unwrap_or("<none>")
                    );

                    store.append_page(Page { records });
                    store.set_resumption_token(next_token.clone());

                    match next_token {
                        Some(token) => cursor = Cursor::Token(token),
                        None => {
                            store.mark_complete();
                            return Ok(HarvestOutcome::Completed);
                        }
                    }

                    if summary.pages_fetched % self.config.checkpoint_every_pages == 0 {
                        if let Err(e) = store.save(&self.config.dump_path) {
                            // periodic checkpoint is best-effort; the
                            // guaranteed save on exit will surface real
                            // persistence failures
                            log::warn!("periodic checkpoint failed: {e:#}");
                        } else {
                            log::debug!("checkpoint after {} pages", summary.pages_fetched);
                        }
                    }
                }
            }
        }
    }

    /// One logical fetch with bounded retries for transport failures.
    ///
    /// Returns `Ok(None)` when a shutdown request interrupted the backoff.
    fn fetch_with_retry(
        &self,
        fetcher: &impl FetchPage,
        cursor: &Cursor,
        shutdown: &ShutdownFlag,
        summary: &mut HarvestSummary,
    ) -> Result<Option<PageOutcome>, HarvestError> {
        let max_retries = self.config.max_transport_retries;
        let mut attempt: u32 = 0;
        loop {
            match fetcher.fetch(cursor) {
                Ok(outcome) => return Ok(Some(outcome)),
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    attempt += 1;
                    summary.transport_retries += 1;
                    let delay = backoff_duration(attempt);
                    log::warn!("fetch attempt {attempt}/{max_retries} failed: {e}, retrying in {delay:?}");
                    if !interruptible_sleep(delay, shutdown) {
                        return Ok(None);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Exponential backoff: 2^attempt seconds (2s, 4s, 8s, ...)
const fn backoff_duration(attempt: u32) -> Duration {
    Duration::from_secs(2u64.pow(attempt))
}

/// Clamp a server-directed wait; zero and over-cap values get the default.
fn clamp_retry_wait(secs: u64) -> u64 {
    if secs == 0 || secs > MAX_RETRY_WAIT_SECS {
        DEFAULT_RETRY_WAIT_SECS
    } else {
        secs
    }
}

/// Sleep in one-second slices, polling the shutdown flag between slices.
/// Returns `false` when the sleep was cut short by a shutdown request.
fn interruptible_sleep(total: Duration, shutdown: &ShutdownFlag) -> bool {
    let mut remaining = total;
    while remaining > Duration::ZERO {
        if shutdown.is_requested() {
            return false;
        }
        let slice = remaining.min(Duration::from_secs(1));
        std::thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
    !shutdown.is_requested()
}
