//! Binary entry point for triplecull.
//!
//! This binary provides the CLI interface for the router and deduplicator.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{Parser, Subcommand};
use std::num::{NonZeroU64, NonZeroUsize};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use triplecull::config::TripleCullConfig;
use triplecull::observability::{self, InitOptions};

/// Triplecull - route and deduplicate knowledge-graph triple dumps.
#[derive(Parser)]
#[command(name = "triplecull")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "TRIPLECULL_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Print summaries (and logs) as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Split a triple dump into generic, type, and label files.
    Route {
        /// Triple dump to read (`-` for stdin).
        input: PathBuf,

        /// Output for kept generic triples.
        generic: PathBuf,

        /// Output for `entity_id<TAB>type_id` records.
        types: PathBuf,

        /// Output for `entity_id<TAB>name` records.
        labels: PathBuf,

        /// Lines between progress reports.
        #[arg(long)]
        progress_interval: Option<NonZeroU64>,
    },

    /// Split a reference collection into lines missing from and present in a candidate.
    Dedupe {
        /// Reference ("from") collection.
        reference: PathBuf,

        /// Candidate ("with") collection.
        candidate: PathBuf,

        /// Output for reference lines absent from the candidate.
        difference: PathBuf,

        /// Output for lines present in both.
        matched: PathBuf,

        /// Sort entirely in memory instead of spilling runs to disk.
        #[arg(long)]
        in_memory: bool,

        /// Directory for scratch files.
        #[arg(long)]
        scratch_dir: Option<PathBuf>,

        /// In-memory chunk budget for the external sort, in bytes.
        #[arg(long)]
        chunk_bytes: Option<NonZeroUsize>,
    },

    /// Show the effective configuration.
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_from_config(
        &config.logging,
        InitOptions {
            verbose: cli.verbose,
            json: cli.json,
        },
    ) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: TripleCullConfig) -> anyhow::Result<()> {
    match cli.command {
        Commands::Route {
            input,
            generic,
            types,
            labels,
            progress_interval,
        } => {
            let mut config = config;
            if let Some(interval) = progress_interval {
                config.router.progress_interval = interval;
            }
            commands::cmd_route(&config, &input, &generic, &types, &labels, cli.json)
        },

        Commands::Dedupe {
            reference,
            candidate,
            difference,
            matched,
            in_memory,
            scratch_dir,
            chunk_bytes,
        } => {
            let mut config = config;
            if let Some(dir) = scratch_dir {
                config = config.with_scratch_dir(dir);
            }
            if let Some(bytes) = chunk_bytes {
                config.sort.chunk_bytes = bytes;
            }
            commands::cmd_dedupe(
                &config,
                &reference,
                &candidate,
                &difference,
                &matched,
                in_memory,
                cli.json,
            )
        },

        Commands::Config => commands::cmd_config(&config, cli.json),
    }
}

/// Loads configuration from an explicit path or the default location, then
/// applies environment overrides.
fn load_config(path: Option<&Path>) -> triplecull::Result<TripleCullConfig> {
    let config = match path {
        Some(config_path) => TripleCullConfig::load_from_file(config_path)?,
        None => TripleCullConfig::load_default(),
    };
    Ok(config.with_env_overrides())
}
