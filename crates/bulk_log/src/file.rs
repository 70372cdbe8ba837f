//! File-based logger.

use crate::error::{LogError, LogResult};
use crate::format::{log_file_name, render_block};
use crate::logger::BlockLogger;
use crate::timestamp::Timestamp;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A logger that publishes each block twice: to an echo sink and to a
/// per-block log file named `bulk<timestamp>.log`.
///
/// The log file is opened (created or truncated) before anything is echoed,
/// so a block whose file cannot be opened produces no output at all. Two
/// blocks stamped with the same second share a file name; the later block
/// replaces the earlier one.
///
/// If the echo sink fails after the file was written, the write reports
/// [`LogError::Io`] and the file already holds the block. The caller keeps
/// the block and its retry rewrites the same file with the merged block, so
/// the file never ends up holding a partial block.
///
/// # Thread Safety
///
/// The echo sink is guarded by a mutex; concurrent writes never interleave
/// within a line.
///
/// # Example
///
/// ```no_run
/// use bulk_log::{BlockLogger, FileLogger, Timestamp};
/// use std::path::Path;
///
/// let logger = FileLogger::new(Path::new("."));
/// logger.write(&Timestamp::from_secs(1700000000), &["cmd1".to_string()]).unwrap();
/// ```
pub struct FileLogger {
    dir: PathBuf,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl FileLogger {
    /// Creates a logger writing files into `dir` and echoing to stdout.
    #[must_use]
    pub fn new(dir: &Path) -> Self {
        Self::with_sink(dir, Box::new(io::stdout()))
    }

    /// Creates a logger writing files into `dir` and echoing to `sink`.
    #[must_use]
    pub fn with_sink(dir: &Path, sink: Box<dyn Write + Send>) -> Self {
        Self {
            dir: dir.to_path_buf(),
            sink: Mutex::new(sink),
        }
    }

    /// Returns the directory log files are written into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the log file for a block stamped `timestamp`.
    #[must_use]
    pub fn path_for(&self, timestamp: &Timestamp) -> PathBuf {
        self.dir.join(log_file_name(timestamp))
    }
}

impl std::fmt::Debug for FileLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLogger")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl BlockLogger for FileLogger {
    fn write(&self, timestamp: &Timestamp, commands: &[String]) -> LogResult<()> {
        if commands.is_empty() {
            return Err(LogError::EmptyBatch);
        }

        let path = self.path_for(timestamp);
        let line = render_block(commands);

        let mut file = File::create(&path).map_err(|source| LogError::File {
            path: path.clone(),
            source,
        })?;
        writeln!(file, "{line}")
            .and_then(|()| file.flush())
            .map_err(|source| LogError::File {
                path: path.clone(),
                source,
            })?;

        let mut sink = self.sink.lock();
        writeln!(sink, "{line}")?;
        sink.flush()?;

        debug!(path = %path.display(), commands = commands.len(), "block written");
        Ok(())
    }
}
