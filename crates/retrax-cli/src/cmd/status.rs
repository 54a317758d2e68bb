//! Status subcommand: inspect a harvested dump.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use retrax_harvest::RecordStore;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Dump file (default from config)
    #[arg(short, long)]
    pub dump: Option<PathBuf>,
}

pub fn run(args: StatusArgs, config: &Config) -> Result<ExitCode> {
    let dump_path = args.dump.unwrap_or_else(|| config.harvest.dump.clone());

    let Some(store) = RecordStore::load_if_exists(&dump_path)? else {
        println!("no dump at {}", dump_path.display());
        return Ok(ExitCode::from(1));
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Dump").fg(Color::Cyan),
            Cell::new(dump_path.display().to_string()).fg(Color::Cyan),
        ]);
    table.add_row(vec![
        "State",
        if store.is_complete() {
            "complete"
        } else {
            "partial"
        },
    ]);
    table.add_row(vec!["Pages".to_string(), store.page_count().to_string()]);
    table.add_row(vec![
        "Records (merged)".to_string(),
        store.record_count().to_string(),
    ]);
    table.add_row(vec![
        "Pending token".to_string(),
        store.resumption_token().unwrap_or("-").to_string(),
    ]);
    println!("{table}");

    Ok(ExitCode::SUCCESS)
}
