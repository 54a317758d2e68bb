//! retrax - harvest arXiv metadata and report lifecycle statistics
//!
//! `harvest` pulls `arXivRaw` records over OAI-PMH into a resumable local
//! dump; `stats` computes per-year submission/update/retraction counts and
//! time-to-event histograms over it; `status` inspects a dump.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "retrax")]
#[command(about = "arXiv metadata harvester and lifecycle statistics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Suppress info logs (only warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Enable debug logging (includes per-record parse errors)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./retrax.toml or ~/.config/retrax/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Harvest records into the local dump (resumes if one exists)
    Harvest(cmd::harvest::HarvestArgs),
    /// Compute lifecycle statistics over a harvested dump
    Stats(cmd::stats::StatsArgs),
    /// Show the state of a harvested dump
    Status(cmd::status::StatusArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    retrax_core::init_logging(cli.quiet, cli.debug);

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            log::error!("configuration error: {e:#}");
            return ExitCode::from(2);
        }
    };

    let result = match cli.command {
        Command::Harvest(args) => {
            setup_signal_handler();
            cmd::harvest::run(args, &config)
        }
        Command::Stats(args) => cmd::stats::run(args, &config),
        Command::Status(args) => cmd::status::run(args, &config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
}

fn setup_signal_handler() {
    // First signal: request checkpoint-and-exit.
    // Second signal: force exit (a stuck request should not trap the user).
    // SAFETY: AtomicBool::store and process::exit are async-signal-safe
    unsafe {
        for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
            signal_hook::low_level::register(signal, || {
                if retrax_core::shutdown::global().request() {
                    std::process::exit(130);
                }
            })
            .expect("failed to register signal handler");
        }
    }
}
