//! In-memory logger for testing.

use crate::error::{LogError, LogResult};
use crate::logger::BlockLogger;
use crate::timestamp::Timestamp;
use parking_lot::{Mutex, RwLock};

/// A block captured by [`InMemoryLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedBlock {
    /// Timestamp the block was written under.
    pub timestamp: Timestamp,
    /// Commands of the block, in order.
    pub commands: Vec<String>,
}

/// An in-memory logger that records every block it accepts.
///
/// This logger is suitable for:
/// - Unit tests of the accumulator
/// - Integration tests that assert on flush order
///
/// Failures can be injected with [`InMemoryLogger::fail_next`], which makes
/// the next `n` writes fail without recording anything.
///
/// # Thread Safety
///
/// This logger is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use bulk_log::{BlockLogger, InMemoryLogger, Timestamp};
///
/// let logger = InMemoryLogger::new();
/// logger.fail_next(1);
/// let block = vec!["a".to_string()];
/// assert!(logger.write(&Timestamp::from_secs(1), &block).is_err());
/// assert!(logger.write(&Timestamp::from_secs(1), &block).is_ok());
/// assert_eq!(logger.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryLogger {
    blocks: RwLock<Vec<LoggedBlock>>,
    fail_remaining: Mutex<usize>,
    attempts: Mutex<usize>,
}

impl InMemoryLogger {
    /// Creates a new empty logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` writes fail.
    pub fn fail_next(&self, count: usize) {
        *self.fail_remaining.lock() = count;
    }

    /// Returns a copy of all recorded blocks, oldest first.
    #[must_use]
    pub fn blocks(&self) -> Vec<LoggedBlock> {
        self.blocks.read().clone()
    }

    /// Returns the number of recorded blocks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    /// Returns true if no block has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    /// Returns the number of `write` calls, successful or not.
    #[must_use]
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }

    /// Clears all recorded blocks.
    pub fn clear(&self) {
        self.blocks.write().clear();
    }
}

impl BlockLogger for InMemoryLogger {
    fn write(&self, timestamp: &Timestamp, commands: &[String]) -> LogResult<()> {
        *self.attempts.lock() += 1;

        if commands.is_empty() {
            return Err(LogError::EmptyBatch);
        }

        {
            let mut remaining = self.fail_remaining.lock();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(LogError::Unavailable("injected failure".into()));
            }
        }

        self.blocks.write().push(LoggedBlock {
            timestamp: *timestamp,
            commands: commands.to_vec(),
        });
        Ok(())
    }
}
