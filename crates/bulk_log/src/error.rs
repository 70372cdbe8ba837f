//! Error types for logger operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for logger operations.
pub type LogResult<T> = Result<T, LogError>;

/// Errors that can occur while writing a block.
#[derive(Debug, Error)]
pub enum LogError {
    /// The block had no timestamp or no commands; nothing was written.
    #[error("refusing to write an empty block")]
    EmptyBatch,

    /// The log file could not be opened or written.
    #[error("cannot write log file {path}: {source}")]
    File {
        /// Path of the log file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The echo sink could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The logger was configured to reject writes.
    #[error("logger unavailable: {0}")]
    Unavailable(String),
}
