//! Block logger trait definition.

use crate::error::LogResult;
use crate::timestamp::Timestamp;

/// A sink for completed blocks.
///
/// Loggers receive a block exactly once per flush attempt and report whether
/// it was published. The caller keeps the block when `write` fails, so a
/// logger must not partially consume it.
///
/// # Invariants
///
/// - `write` with an empty command slice fails with [`crate::LogError::EmptyBatch`]
///   and performs no writes
/// - commands are published verbatim and in slice order
/// - loggers must be `Send + Sync`
///
/// # Implementors
///
/// - [`super::InMemoryLogger`] - For testing
/// - [`super::FileLogger`] - Writes to a sink and a per-block log file
pub trait BlockLogger: Send + Sync {
    /// Publishes one block.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `commands` is empty
    /// - the destination cannot be opened or written
    fn write(&self, timestamp: &Timestamp, commands: &[String]) -> LogResult<()>;
}

impl<L: BlockLogger + ?Sized> BlockLogger for &L {
    fn write(&self, timestamp: &Timestamp, commands: &[String]) -> LogResult<()> {
        (**self).write(timestamp, commands)
    }
}
