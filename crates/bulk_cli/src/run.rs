//! Processing standard input.

use crate::SummaryFormat;
use bulk_core::{BlockAccumulator, Config, Session, Summary};
use bulk_log::FileLogger;
use std::io::{self, BufRead};
use tracing::{error, info};

/// Runs the accumulator over stdin, logging blocks into `config.log_dir`.
pub fn run(
    config: &Config,
    summary: Option<SummaryFormat>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        block_size = config.block_size,
        log_dir = %config.log_dir.display(),
        "processing commands"
    );

    let stdin = io::stdin();
    let (result, stats) = process(config, stdin.lock())?;

    if let Some(format) = summary {
        print_summary(&stats, format)?;
    }

    if let Err(e) = result {
        error!(error = %e, "processing stopped");
        return Err(e.into());
    }
    Ok(())
}

/// Runs a session over `input`, returning the outcome alongside the counters
/// reached, which are available even when the run fails.
fn process<R: BufRead>(
    config: &Config,
    input: R,
) -> bulk_core::CoreResult<(bulk_core::CoreResult<Summary>, Summary)> {
    let logger = FileLogger::new(&config.log_dir);
    let mut session = Session::new(BlockAccumulator::new(config, logger)?);
    let result = session.run(input);
    let stats = session.accumulator().summary();
    Ok((result, stats))
}

fn print_summary(
    stats: &Summary,
    format: SummaryFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        SummaryFormat::Json => {
            eprintln!("{}", serde_json::to_string_pretty(stats)?);
        }
        SummaryFormat::Text => {
            eprintln!("{stats}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn log_files(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn process_writes_log_files() {
        let dir = tempdir().unwrap();
        let config = Config::new(3).log_dir(dir.path());

        let (result, stats) = process(&config, Cursor::new("a\nb\nc\n")).unwrap();
        assert!(result.is_ok());
        assert_eq!(stats.blocks_flushed, 1);

        let files = log_files(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("bulk") && files[0].ends_with(".log"));
        let contents = std::fs::read_to_string(dir.path().join(&files[0])).unwrap();
        assert_eq!(contents, "bulk: a, b, c, \n");
    }

    #[test]
    fn process_keeps_counters_on_failure() {
        let dir = tempdir().unwrap();
        let config = Config::new(5).log_dir(dir.path());

        let (result, stats) = process(&config, Cursor::new("a\n}\n")).unwrap();
        assert!(result.is_err());
        assert_eq!(stats.lines_read, 2);
        assert_eq!(stats.blocks_flushed, 1);
        assert_eq!(log_files(dir.path()).len(), 1);
    }

    #[test]
    fn process_missing_log_dir_counts_failures() {
        let dir = tempdir().unwrap();
        let config = Config::new(1).log_dir(dir.path().join("missing"));

        let (result, stats) = process(&config, Cursor::new("a\n")).unwrap();
        let summary = result.unwrap();
        assert_eq!(summary.blocks_flushed, 0);
        assert_eq!(stats.failed_flushes, 2);
        assert_eq!(stats.commands_dropped, 1);
    }

    #[test]
    fn summary_serializes_as_json() {
        let stats = Summary {
            lines_read: 3,
            blocks_flushed: 1,
            commands_flushed: 3,
            failed_flushes: 0,
            commands_dropped: 0,
        };
        let json: serde_json::Value = serde_json::to_value(stats).unwrap();
        assert_eq!(json["blocks_flushed"], 1);
        assert_eq!(json["commands_flushed"], 3);
    }
}
