//! Harvest subcommand.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use retrax_harvest::{HarvestConfig, HarvestOutcome, Harvester, OaiPageFetcher, RecordStore};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct HarvestArgs {
    /// Dump file (default from config)
    #[arg(short, long)]
    pub dump: Option<PathBuf>,

    /// Lower datestamp bound of the initial query (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Set (category) filter, e.g. "cs"
    #[arg(long)]
    pub set: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub request_timeout: u64,

    /// Maximum retries for transient transport failures
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,
}

pub fn run(args: HarvestArgs, config: &Config) -> Result<ExitCode> {
    let harvest_config = HarvestConfig {
        endpoint: config.harvest.endpoint.clone(),
        from_date: args.from.unwrap_or_else(|| config.harvest.from.clone()),
        metadata_prefix: config.harvest.metadata_prefix.clone(),
        set_spec: args.set.unwrap_or_else(|| config.harvest.set.clone()),
        dump_path: args.dump.unwrap_or_else(|| config.harvest.dump.clone()),
        request_timeout_secs: args.request_timeout,
        max_transport_retries: args.max_retries,
        ..HarvestConfig::default()
    };

    let mut store = match RecordStore::load_if_exists(&harvest_config.dump_path)? {
        Some(store) => {
            log::info!(
                "loaded existing dump {} ({} pages, {} records, {})",
                harvest_config.dump_path.display(),
                store.page_count(),
                store.record_count(),
                if store.is_complete() {
                    "complete"
                } else {
                    "partial"
                }
            );
            store
        }
        None => {
            log::info!(
                "starting fresh harvest: from={} set={} prefix={}",
                harvest_config.from_date,
                harvest_config.set_spec,
                harvest_config.metadata_prefix
            );
            RecordStore::new()
        }
    };

    let fetcher = OaiPageFetcher::new(&harvest_config);
    let summary = Harvester::new(harvest_config)
        .run(&fetcher, &mut store, retrax_core::shutdown::global())
        .context("harvest failed")?;
    summary.log();

    Ok(match summary.outcome {
        HarvestOutcome::Completed => ExitCode::SUCCESS,
        HarvestOutcome::Interrupted => ExitCode::from(130),
    })
}
