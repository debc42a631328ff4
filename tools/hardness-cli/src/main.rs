//! Hardness grading front end.
//!
//! One binary drives the whole workflow: train a model from a directory of
//! press-test recordings, grade new recordings with it, watch a directory
//! for arrivals, and check that the environment is set up.
//!
//! # Commands
//!
//! - `hardness train` - Cluster the dataset, persist the model, write reports
//! - `hardness predict <PATH>` - Grade one file or every file in a directory
//! - `hardness watch` - Grade recordings as they arrive, until Enter
//! - `hardness check` - Verify data, geometry and model are in place
//! - `hardness config` - Print or write the effective configuration
//!
//! Logging goes to stderr and honors `RUST_LOG`; `-v` raises the default
//! level from `info` to `debug`.

mod check;
mod context;
mod predict;
mod train;
mod watch;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Press-test hardness grading
///
/// Unsupervised grades from tactile press recordings.
#[derive(Parser)]
#[command(name = "hardness")]
#[command(about = "Press-test hardness grading", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file (defaults apply to missing fields)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from the data directory and write reports
    Train {
        /// Directory of sample CSV files
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Directory for result artifacts
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Number of hardness grades
        #[arg(long, short = 'k')]
        grades: Option<usize>,

        /// Clustering seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Grade a sample file, or every sample file in a directory
    Predict {
        /// Sample CSV file or directory
        #[arg(name = "PATH")]
        path: PathBuf,

        /// Model file to load
        #[arg(long)]
        model: Option<PathBuf>,

        /// Directory for result artifacts
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print results as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Grade samples as they appear in a directory; press Enter to stop
    Watch {
        /// Directory to watch (defaults to the data directory)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Model file to load
        #[arg(long)]
        model: Option<PathBuf>,

        /// Poll interval in milliseconds
        #[arg(long)]
        poll_ms: Option<u64>,

        /// Stop after this many scans
        #[arg(long)]
        max_cycles: Option<usize>,
    },

    /// Check data directory, geometry file and model
    Check,

    /// Print the effective configuration, or write it to a file
    Config {
        /// Destination file
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = context::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Train {
            data_dir,
            output_dir,
            grades,
            seed,
        } => train::run(
            config,
            &train::Overrides {
                data_dir,
                output_dir,
                grades,
                seed,
            },
        ),
        Commands::Predict {
            path,
            model,
            output_dir,
            json,
        } => predict::run(config, &path, model, output_dir, json),
        Commands::Watch {
            dir,
            model,
            poll_ms,
            max_cycles,
        } => watch::run(config, dir, model, poll_ms, max_cycles),
        Commands::Check => check::run(&config),
        Commands::Config { write } => context::show_config(&config, write.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
