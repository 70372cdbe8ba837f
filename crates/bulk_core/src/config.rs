//! Accumulator configuration.

use crate::error::{CoreError, CoreResult};
use std::path::PathBuf;

/// Default open delimiter.
pub const DEFAULT_OPEN: &str = "{";
/// Default close delimiter.
pub const DEFAULT_CLOSE: &str = "}";
/// Default end-of-stream terminator.
pub const DEFAULT_TERMINATOR: &str = "EOF";

/// The three control lines recognised in the input.
///
/// Matching is exact string equality against a whole line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinels {
    /// Opens a dynamic block.
    pub open: String,
    /// Closes a dynamic block.
    pub close: String,
    /// Ends the input stream.
    pub terminator: String,
}

impl Default for Sentinels {
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN.to_string(),
            close: DEFAULT_CLOSE.to_string(),
            terminator: DEFAULT_TERMINATOR.to_string(),
        }
    }
}

impl Sentinels {
    /// Creates a sentinel set.
    pub fn new(
        open: impl Into<String>,
        close: impl Into<String>,
        terminator: impl Into<String>,
    ) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
            terminator: terminator.into(),
        }
    }

    /// Checks that all sentinels are non-empty and pairwise distinct.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] otherwise.
    pub fn validate(&self) -> CoreResult<()> {
        let named = [
            ("open", &self.open),
            ("close", &self.close),
            ("terminator", &self.terminator),
        ];

        for (name, value) in named {
            if value.is_empty() {
                return Err(CoreError::invalid_config(format!(
                    "{name} sentinel must not be empty"
                )));
            }
        }

        if self.open == self.close || self.open == self.terminator || self.close == self.terminator
        {
            return Err(CoreError::invalid_config(format!(
                "sentinels must be distinct (open {:?}, close {:?}, terminator {:?})",
                self.open, self.close, self.terminator
            )));
        }

        Ok(())
    }
}

/// Configuration for a block accumulator.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of commands that completes a static block. Must be positive.
    pub block_size: usize,

    /// Control lines.
    pub sentinels: Sentinels,

    /// Directory log files are written into.
    pub log_dir: PathBuf,
}

impl Config {
    /// Creates a configuration with the given block size and defaults for
    /// everything else.
    #[must_use]
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            sentinels: Sentinels::default(),
            log_dir: PathBuf::from("."),
        }
    }

    /// Sets the control lines.
    #[must_use]
    pub fn sentinels(mut self, sentinels: Sentinels) -> Self {
        self.sentinels = sentinels;
        self
    }

    /// Sets the log directory.
    #[must_use]
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the block size is zero or the
    /// sentinels are unusable.
    pub fn validate(&self) -> CoreResult<()> {
        if self.block_size == 0 {
            return Err(CoreError::invalid_config("block size must be positive"));
        }
        self.sentinels.validate()
    }
}

/// Parses a block size argument.
///
/// # Errors
///
/// Returns [`CoreError::InvalidConfig`] if `text` is not an integer or is
/// not positive.
pub fn parse_block_size(text: &str) -> CoreResult<usize> {
    let value: i64 = text
        .trim()
        .parse()
        .map_err(|e| CoreError::invalid_config(format!("invalid block size {text:?}: {e}")))?;

    if value <= 0 {
        return Err(CoreError::invalid_config(format!(
            "block size must be positive, got {value}"
        )));
    }

    usize::try_from(value)
        .map_err(|_| CoreError::invalid_config(format!("block size {value} is too large")))
}
