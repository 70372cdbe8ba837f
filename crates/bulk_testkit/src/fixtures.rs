//! Test fixtures.
//!
//! Provides a temporary log directory with a [`FileLogger`] whose echo
//! output is captured in memory.

use bulk_core::{BlockAccumulator, Config, ManualClock, Step};
use bulk_log::{FileLogger, InMemoryLogger};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Epoch second used by test clocks unless a test picks its own.
pub const TEST_EPOCH: u64 = 1_700_000_000;

/// A cloneable in-memory `Write` sink.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// Returns the written lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A temporary log directory, removed on drop.
pub struct TestLogDir {
    dir: TempDir,
    output: CapturedOutput,
}

impl TestLogDir {
    /// Creates a new empty directory.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
            output: CapturedOutput::new(),
        }
    }

    /// Returns the directory path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Creates a file logger writing into this directory and echoing into
    /// [`TestLogDir::output`].
    pub fn logger(&self) -> FileLogger {
        FileLogger::with_sink(self.dir.path(), Box::new(self.output.clone()))
    }

    /// Returns the captured echo output.
    pub fn output(&self) -> &CapturedOutput {
        &self.output
    }

    /// Returns the names of all log files, sorted.
    pub fn log_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .expect("Failed to read log directory")
            .map(|entry| {
                entry
                    .expect("Failed to read directory entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .filter(|name| name.starts_with("bulk") && name.ends_with(".log"))
            .collect();
        names.sort();
        names
    }

    /// Reads a log file by name.
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.file(name)).expect("Failed to read log file")
    }

    /// Returns the full path of a log file.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Default for TestLogDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Feeds `lines` through a fresh in-memory accumulator and finalizes it.
///
/// Stops early at the terminator. Returns the logger so tests can inspect
/// the blocks, alongside the result of `finalize`. Panics if any line is
/// rejected.
pub fn run_lines(
    block_size: usize,
    lines: &[String],
) -> (InMemoryLogger, bulk_core::CoreResult<bulk_core::Summary>) {
    let logger = InMemoryLogger::new();
    let clock = ManualClock::new(TEST_EPOCH);
    let result = {
        let mut acc = BlockAccumulator::with_clock(&Config::new(block_size), &logger, &clock)
            .expect("Failed to create accumulator");
        for line in lines {
            if acc.accept(line).expect("Line rejected") == Step::EndOfStream {
                break;
            }
        }
        acc.finalize()
    };
    (logger, result)
}
