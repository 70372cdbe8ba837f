//! Bulk CLI
//!
//! Reads commands from standard input and writes them out in blocks.
//!
//! Every block is echoed to standard output and written to
//! `bulk<timestamp>.log`. A block completes after `BLOCK_SIZE` commands, or,
//! for commands enclosed in `{` / `}`, at the matching `}`. A line reading
//! `EOF` ends the input early.

mod run;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Groups commands from stdin into logged blocks.
#[derive(Parser, Debug)]
#[command(name = "bulk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of commands per static block
    #[arg(value_parser = parse_block_size, allow_negative_numbers = true)]
    block_size: usize,

    /// Directory to write log files into
    #[arg(short = 'd', long, default_value = ".")]
    log_dir: PathBuf,

    /// Line that opens a dynamic block
    #[arg(long, default_value = bulk_core::DEFAULT_OPEN)]
    open: String,

    /// Line that closes a dynamic block
    #[arg(long, default_value = bulk_core::DEFAULT_CLOSE)]
    close: String,

    /// Line that ends the input
    #[arg(long, default_value = bulk_core::DEFAULT_TERMINATOR)]
    terminator: String,

    /// Print a run summary to stderr
    #[arg(short, long, value_enum)]
    summary: Option<SummaryFormat>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Run summary output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SummaryFormat {
    /// Human-readable text
    Text,
    /// JSON object
    Json,
}

fn parse_block_size(text: &str) -> Result<usize, String> {
    bulk_core::parse_block_size(text).map_err(|e| e.to_string())
}

impl Cli {
    fn config(&self) -> bulk_core::Config {
        bulk_core::Config::new(self.block_size)
            .sentinels(bulk_core::Sentinels::new(
                self.open.clone(),
                self.close.clone(),
                self.terminator.clone(),
            ))
            .log_dir(self.log_dir.clone())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Diagnostics go to stderr; stdout carries the blocks.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config();
    config.validate()?;

    run::run(&config, cli.summary)?;

    Ok(())
}
