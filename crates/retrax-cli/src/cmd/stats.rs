//! Stats subcommand.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use retrax_harvest::RecordStore;
use retrax_stats::{YearRange, analyze};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Dump file (default from config)
    #[arg(short, long)]
    pub dump: Option<PathBuf>,

    /// First year of the report window
    #[arg(long)]
    pub first_year: Option<i32>,

    /// Last year of the report window
    #[arg(long)]
    pub last_year: Option<i32>,
}

pub fn run(args: StatsArgs, config: &Config) -> Result<ExitCode> {
    let dump_path = args.dump.unwrap_or_else(|| config.harvest.dump.clone());
    let store = RecordStore::load_if_exists(&dump_path)?
        .with_context(|| format!("no dump at {} (run `retrax harvest` first)", dump_path.display()))?;

    if !store.is_complete() {
        log::warn!(
            "dump is partial (pending token {}); statistics cover the harvested subset",
            store.resumption_token().unwrap_or("<none>")
        );
    }

    let range = YearRange {
        first: args.first_year.unwrap_or(config.analysis.first_year),
        last: args.last_year.unwrap_or(config.analysis.last_year),
    };
    anyhow::ensure!(
        range.first <= range.last,
        "invalid year range {}..={}",
        range.first,
        range.last
    );

    let records = store.merged_records();
    log::info!(
        "analyzing {} records over {}..={}",
        records.len(),
        range.first,
        range.last
    );

    let report = analyze(records, range);
    if std::io::stdout().is_terminal() {
        report.print();
    } else {
        report.log();
    }

    Ok(ExitCode::SUCCESS)
}
