//! Run statistics.

use serde::Serialize;
use std::fmt;

/// Counters describing one run of an accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Input lines passed to `accept`, sentinels included.
    pub lines_read: u64,
    /// Blocks handed to the logger successfully.
    pub blocks_flushed: u64,
    /// Commands contained in those blocks.
    pub commands_flushed: u64,
    /// Flush attempts the logger rejected.
    pub failed_flushes: u64,
    /// Commands never logged: discarded with an unclosed block, still
    /// pending after the final flush failed, or left over when a run was
    /// aborted.
    pub commands_dropped: u64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Lines read:       {}", self.lines_read)?;
        writeln!(f, "Blocks flushed:   {}", self.blocks_flushed)?;
        writeln!(f, "Commands flushed: {}", self.commands_flushed)?;
        writeln!(f, "Failed flushes:   {}", self.failed_flushes)?;
        write!(f, "Commands dropped: {}", self.commands_dropped)
    }
}
