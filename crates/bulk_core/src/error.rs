//! Error types for bulk core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in bulk core operations.
///
/// Logger failures never appear here: the accumulator absorbs them and keeps
/// the block.
#[derive(Debug, Error)]
pub enum CoreError {
    /// I/O error while reading input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration rejected before processing started.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },

    /// A close delimiter arrived while no block was open.
    #[error("unbalanced close delimiter {delimiter:?} at line {line}: no block is open")]
    UnbalancedClose {
        /// The close delimiter text.
        delimiter: String,
        /// One-based input line number.
        line: u64,
    },

    /// The input ended while a dynamic block was still open.
    #[error("input ended inside a dynamic block (depth {depth}); {dropped} command(s) discarded")]
    UnclosedBlock {
        /// Nesting depth at end of input.
        depth: usize,
        /// Number of commands discarded with the open block.
        dropped: usize,
    },
}

impl CoreError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Returns true for errors caused by unbalanced delimiters.
    #[must_use]
    pub fn is_unbalanced(&self) -> bool {
        matches!(self, Self::UnbalancedClose { .. } | Self::UnclosedBlock { .. })
    }
}
