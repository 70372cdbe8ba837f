//! Block accumulation state machine.
//!
//! The accumulator groups incoming command lines into blocks and hands each
//! complete block to a [`BlockLogger`].
//!
//! ## Static and dynamic blocks
//!
//! Outside any delimiters the accumulator is in [`Mode::Static`]: a block is
//! complete once it holds `block_size` commands. An open delimiter switches
//! to [`Mode::Dynamic`], flushing whatever static commands were pending; from
//! then on size is ignored and the block completes only when the matching
//! close delimiter brings the depth back to zero. Nested delimiters only move
//! the depth counter.
//!
//! ## Flush protocol
//!
//! A flush of an empty block does nothing. A flush the logger rejects keeps
//! the block (and its timestamp) intact; the commands are retried as part of
//! the next flush. Logger failures never escape the accumulator.

use crate::clock::{Clock, SystemClock};
use crate::config::{Config, Sentinels};
use crate::error::{CoreError, CoreResult};
use crate::stats::Summary;
use bulk_log::{BlockLogger, Timestamp};
use tracing::{debug, warn};

/// Block mode, derived from the number of unmatched open delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// No open delimiters; blocks complete by size.
    #[default]
    Static,
    /// Inside at least one open delimiter.
    Dynamic {
        /// Number of unmatched open delimiters, always at least 1.
        depth: usize,
    },
}

impl Mode {
    /// Returns the nesting depth (0 in static mode).
    #[must_use]
    pub fn depth(self) -> usize {
        match self {
            Self::Static => 0,
            Self::Dynamic { depth } => depth,
        }
    }

    /// Returns true inside a dynamic block.
    #[must_use]
    pub fn is_dynamic(self) -> bool {
        matches!(self, Self::Dynamic { .. })
    }
}

/// What the caller should do after [`BlockAccumulator::accept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep feeding lines.
    Continue,
    /// The terminator was seen; stop reading and call `finalize`.
    EndOfStream,
}

/// Outcome of one flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flush {
    /// The block was logged and cleared.
    Written,
    /// There was nothing to flush.
    Empty,
    /// The logger rejected the block; it is still pending.
    Failed,
}

/// The pending block: commands plus the second its first command arrived.
#[derive(Debug, Default)]
struct Batch {
    timestamp: Option<Timestamp>,
    commands: Vec<String>,
}

impl Batch {
    fn push(&mut self, command: &str, clock: &dyn Clock) {
        if self.commands.is_empty() && self.timestamp.is_none() {
            self.timestamp = Some(clock.now());
        }
        self.commands.push(command.to_string());
    }

    fn clear(&mut self) {
        self.timestamp = None;
        self.commands.clear();
    }
}

/// Groups command lines into blocks and flushes them to a logger.
///
/// # Example
///
/// ```rust
/// use bulk_core::{BlockAccumulator, Config, ManualClock, Step};
/// use bulk_log::InMemoryLogger;
///
/// let logger = InMemoryLogger::new();
/// let clock = ManualClock::new(1700000000);
/// let mut acc = BlockAccumulator::with_clock(&Config::new(2), &logger, &clock).unwrap();
///
/// for line in ["a", "b", "c"] {
///     assert_eq!(acc.accept(line).unwrap(), Step::Continue);
/// }
/// acc.finalize().unwrap();
///
/// let blocks = logger.blocks();
/// assert_eq!(blocks[0].commands, vec!["a", "b"]);
/// assert_eq!(blocks[1].commands, vec!["c"]);
/// ```
pub struct BlockAccumulator<L, C = SystemClock> {
    block_size: usize,
    sentinels: Sentinels,
    mode: Mode,
    pending: Batch,
    logger: L,
    clock: C,
    stats: Summary,
}

impl<L: BlockLogger> BlockAccumulator<L, SystemClock> {
    /// Creates an accumulator stamping blocks with wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: &Config, logger: L) -> CoreResult<Self> {
        Self::with_clock(config, logger, SystemClock)
    }
}

impl<L: BlockLogger, C: Clock> BlockAccumulator<L, C> {
    /// Creates an accumulator with an explicit time source.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] if the configuration is invalid.
    pub fn with_clock(config: &Config, logger: L, clock: C) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            block_size: config.block_size,
            sentinels: config.sentinels.clone(),
            mode: Mode::Static,
            pending: Batch::default(),
            logger,
            clock,
            stats: Summary::default(),
        })
    }

    /// Processes one input line.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnbalancedClose`] for a close delimiter while no
    /// block is open. The line is ignored and the state is unchanged.
    pub fn accept(&mut self, line: &str) -> CoreResult<Step> {
        self.stats.lines_read += 1;

        if line == self.sentinels.open {
            self.open_block();
        } else if line == self.sentinels.close {
            self.close_block()?;
        } else if line == self.sentinels.terminator {
            debug!(depth = self.mode.depth(), "terminator received");
            return Ok(Step::EndOfStream);
        } else {
            self.push_command(line);
        }

        Ok(Step::Continue)
    }

    /// Flushes what remains once the input has ended.
    ///
    /// Returns the run summary.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnclosedBlock`] if a dynamic block is still open.
    /// Its commands are discarded without being logged.
    pub fn finalize(&mut self) -> CoreResult<Summary> {
        if let Mode::Dynamic { depth } = self.mode {
            let dropped = self.pending.commands.len();
            warn!(depth, dropped, "input ended inside a dynamic block");
            self.stats.commands_dropped += dropped as u64;
            self.pending.clear();
            self.mode = Mode::Static;
            return Err(CoreError::UnclosedBlock { depth, dropped });
        }

        if self.flush() == Flush::Failed {
            let dropped = self.pending.commands.len();
            warn!(dropped, "final block could not be logged");
            self.stats.commands_dropped += dropped as u64;
        }

        Ok(self.stats)
    }

    /// Salvages what it can when a run stops early on an error.
    ///
    /// A pending static block is flushed; whatever still cannot be logged,
    /// including an open dynamic block, is counted as dropped and cleared.
    /// Returns the run summary.
    pub fn abort(&mut self) -> Summary {
        if self.mode == Mode::Static {
            self.flush();
        }

        let dropped = self.pending.commands.len();
        if dropped > 0 {
            warn!(depth = self.mode.depth(), dropped, "run aborted with unlogged commands");
            self.stats.commands_dropped += dropped as u64;
        }
        self.pending.clear();
        self.mode = Mode::Static;
        self.stats
    }

    /// Attempts to flush the pending block.
    fn flush(&mut self) -> Flush {
        let Some(timestamp) = self.pending.timestamp else {
            return Flush::Empty;
        };
        if self.pending.commands.is_empty() {
            return Flush::Empty;
        }

        match self.logger.write(&timestamp, &self.pending.commands) {
            Ok(()) => {
                let count = self.pending.commands.len();
                debug!(%timestamp, commands = count, "block flushed");
                self.stats.blocks_flushed += 1;
                self.stats.commands_flushed += count as u64;
                self.pending.clear();
                Flush::Written
            }
            Err(e) => {
                warn!(%timestamp, commands = self.pending.commands.len(), error = %e,
                    "flush failed, keeping block");
                self.stats.failed_flushes += 1;
                Flush::Failed
            }
        }
    }

    /// Returns the current mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the pending commands.
    #[must_use]
    pub fn pending(&self) -> &[String] {
        &self.pending.commands
    }

    /// Returns the timestamp of the pending block, if it has one.
    #[must_use]
    pub fn pending_timestamp(&self) -> Option<Timestamp> {
        self.pending.timestamp
    }

    /// Returns the configured static block size.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the counters accumulated so far.
    #[must_use]
    pub fn summary(&self) -> Summary {
        self.stats
    }

    fn open_block(&mut self) {
        match self.mode {
            Mode::Static => {
                self.flush();
                self.mode = Mode::Dynamic { depth: 1 };
                debug!("entered dynamic block");
            }
            Mode::Dynamic { depth } => {
                self.mode = Mode::Dynamic { depth: depth + 1 };
            }
        }
    }

    fn close_block(&mut self) -> CoreResult<()> {
        match self.mode {
            Mode::Static => {
                warn!(line = self.stats.lines_read, "close delimiter outside any block");
                Err(CoreError::UnbalancedClose {
                    delimiter: self.sentinels.close.clone(),
                    line: self.stats.lines_read,
                })
            }
            Mode::Dynamic { depth: 1 } => {
                self.mode = Mode::Static;
                debug!("left dynamic block");
                self.flush();
                Ok(())
            }
            Mode::Dynamic { depth } => {
                self.mode = Mode::Dynamic { depth: depth - 1 };
                Ok(())
            }
        }
    }

    fn push_command(&mut self, line: &str) {
        self.pending.push(line, &self.clock);

        // Equality, not >=: a block kept by a failed flush grows past the
        // limit and waits for the next delimiter or finalize.
        if self.mode == Mode::Static && self.pending.commands.len() == self.block_size {
            self.flush();
        }
    }
}

impl<L, C> std::fmt::Debug for BlockAccumulator<L, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockAccumulator")
            .field("block_size", &self.block_size)
            .field("mode", &self.mode)
            .field("pending", &self.pending)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use bulk_log::InMemoryLogger;
    use proptest::prelude::*;

    const T0: u64 = 1_700_000_000;

    fn cmds(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn feed<L: BlockLogger, C: Clock>(acc: &mut BlockAccumulator<L, C>, lines: &[&str]) {
        for line in lines {
            acc.accept(line).unwrap();
        }
    }

    #[test]
    fn static_block_flushes_at_size() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(2), &logger, &clock).unwrap();

        feed(&mut acc, &["a", "b", "c"]);
        assert_eq!(logger.len(), 1);
        assert_eq!(logger.blocks()[0].commands, cmds(&["a", "b"]));
        assert_eq!(acc.pending(), cmds(&["c"]).as_slice());

        acc.finalize().unwrap();
        assert_eq!(logger.len(), 2);
        assert_eq!(logger.blocks()[1].commands, cmds(&["c"]));
    }

    #[test]
    fn exact_block_size_leaves_nothing_for_finalize() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(3), &logger, &clock).unwrap();

        feed(&mut acc, &["a", "b", "c"]);
        assert_eq!(logger.len(), 1);

        acc.finalize().unwrap();
        assert_eq!(logger.len(), 1);
        assert_eq!(logger.attempts(), 1);
    }

    #[test]
    fn mixed_static_and_dynamic() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(10), &logger, &clock).unwrap();

        feed(&mut acc, &["a", "b", "{", "c", "}", "d"]);
        assert_eq!(logger.len(), 2);
        acc.finalize().unwrap();

        let blocks = logger.blocks();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].commands, cmds(&["a", "b"]));
        assert_eq!(blocks[1].commands, cmds(&["c"]));
        assert_eq!(blocks[2].commands, cmds(&["d"]));
    }

    #[test]
    fn dynamic_block_ignores_size() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(2), &logger, &clock).unwrap();

        feed(&mut acc, &["{", "a", "b", "c", "d", "e"]);
        assert!(logger.is_empty());
        assert_eq!(acc.mode(), Mode::Dynamic { depth: 1 });
        assert!(acc.mode().is_dynamic());
        assert_eq!(acc.block_size(), 2);

        feed(&mut acc, &["}"]);
        assert_eq!(logger.len(), 1);
        assert_eq!(logger.blocks()[0].commands, cmds(&["a", "b", "c", "d", "e"]));
        assert_eq!(acc.mode(), Mode::Static);
    }

    #[test]
    fn nested_blocks_flush_once_at_outer_close() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(1), &logger, &clock).unwrap();

        feed(&mut acc, &["{", "a", "{", "b", "c", "}", "d"]);
        assert!(logger.is_empty());
        assert_eq!(acc.mode().depth(), 1);

        feed(&mut acc, &["}"]);
        assert_eq!(logger.len(), 1);
        assert_eq!(logger.blocks()[0].commands, cmds(&["a", "b", "c", "d"]));
    }

    #[test]
    fn open_with_nothing_pending_does_not_call_logger() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(3), &logger, &clock).unwrap();

        feed(&mut acc, &["{", "}"]);
        acc.finalize().unwrap();
        assert_eq!(logger.attempts(), 0);
    }

    #[test]
    fn terminator_ends_stream_at_any_depth() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(3), &logger, &clock).unwrap();

        assert_eq!(acc.accept("EOF").unwrap(), Step::EndOfStream);
        assert_eq!(acc.accept("{").unwrap(), Step::Continue);
        assert_eq!(acc.accept("EOF").unwrap(), Step::EndOfStream);
    }

    #[test]
    fn empty_input_logs_nothing() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(3), &logger, &clock).unwrap();

        let summary = acc.finalize().unwrap();
        assert_eq!(logger.attempts(), 0);
        assert_eq!(summary, Summary::default());
    }

    #[test]
    fn timestamp_taken_at_first_command() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(2), &logger, &clock).unwrap();

        feed(&mut acc, &["a"]);
        assert_eq!(acc.pending_timestamp(), Some(Timestamp::from_secs(T0)));
        clock.advance(3);
        feed(&mut acc, &["b"]);

        clock.advance(4);
        feed(&mut acc, &["c"]);
        clock.advance(10);
        acc.finalize().unwrap();

        let blocks = logger.blocks();
        assert_eq!(blocks[0].timestamp, Timestamp::from_secs(T0));
        assert_eq!(blocks[1].timestamp, Timestamp::from_secs(T0 + 7));
        assert_eq!(acc.pending_timestamp(), None);
    }

    #[test]
    fn dynamic_block_stamped_at_first_command() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(5), &logger, &clock).unwrap();

        feed(&mut acc, &["{"]);
        clock.advance(2);
        feed(&mut acc, &["a"]);
        clock.advance(2);
        feed(&mut acc, &["b", "}"]);

        assert_eq!(logger.blocks()[0].timestamp, Timestamp::from_secs(T0 + 2));
    }

    #[test]
    fn stray_close_is_rejected_without_state_change() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(3), &logger, &clock).unwrap();

        feed(&mut acc, &["a"]);
        let err = acc.accept("}").unwrap_err();
        assert!(matches!(err, CoreError::UnbalancedClose { line: 2, .. }));
        assert!(err.is_unbalanced());
        assert_eq!(acc.mode(), Mode::Static);
        assert_eq!(acc.pending(), cmds(&["a"]).as_slice());

        // Static mode keeps working afterwards.
        feed(&mut acc, &["b", "c"]);
        assert_eq!(logger.blocks()[0].commands, cmds(&["a", "b", "c"]));
    }

    #[test]
    fn unclosed_block_is_reported_and_dropped() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(3), &logger, &clock).unwrap();

        feed(&mut acc, &["x", "{", "a", "{", "b"]);
        assert_eq!(logger.len(), 1);

        let err = acc.finalize().unwrap_err();
        assert!(matches!(err, CoreError::UnclosedBlock { depth: 2, dropped: 2 }));
        assert_eq!(logger.len(), 1);
        assert_eq!(acc.summary().commands_dropped, 2);
        assert!(acc.pending().is_empty());
    }

    #[test]
    fn failed_flush_keeps_block_and_merges() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(2), &logger, &clock).unwrap();

        logger.fail_next(1);
        feed(&mut acc, &["a", "b"]);
        assert!(logger.is_empty());
        assert_eq!(acc.pending(), cmds(&["a", "b"]).as_slice());

        // Size trigger already passed; the block grows until something else flushes.
        clock.advance(1);
        feed(&mut acc, &["c", "d"]);
        assert!(logger.is_empty());

        feed(&mut acc, &["{"]);
        let blocks = logger.blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].commands, cmds(&["a", "b", "c", "d"]));
        assert_eq!(blocks[0].timestamp, Timestamp::from_secs(T0));

        let summary = acc.summary();
        assert_eq!(summary.failed_flushes, 1);
        assert_eq!(summary.blocks_flushed, 1);
        assert_eq!(summary.commands_flushed, 4);
    }

    #[test]
    fn abort_flushes_pending_static_block() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(5), &logger, &clock).unwrap();

        feed(&mut acc, &["a", "b"]);
        let summary = acc.abort();
        assert_eq!(logger.blocks()[0].commands, cmds(&["a", "b"]));
        assert_eq!(summary.commands_dropped, 0);
        assert!(acc.pending().is_empty());
    }

    #[test]
    fn abort_counts_unloggable_commands() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(5), &logger, &clock).unwrap();

        feed(&mut acc, &["a", "b"]);
        logger.fail_next(1);
        let summary = acc.abort();
        assert_eq!(summary.failed_flushes, 1);
        assert_eq!(summary.commands_dropped, 2);
        assert!(logger.is_empty());
    }

    #[test]
    fn abort_drops_open_dynamic_block() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(5), &logger, &clock).unwrap();

        feed(&mut acc, &["{", "a", "b", "c"]);
        let summary = acc.abort();
        assert_eq!(logger.attempts(), 0);
        assert_eq!(summary.commands_dropped, 3);
        assert_eq!(acc.mode(), Mode::Static);
    }

    #[test]
    fn failed_final_flush_counts_dropped() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(5), &logger, &clock).unwrap();

        feed(&mut acc, &["a", "b"]);
        logger.fail_next(1);
        let summary = acc.finalize().unwrap();
        assert_eq!(summary.failed_flushes, 1);
        assert_eq!(summary.commands_dropped, 2);
    }

    #[test]
    fn custom_sentinels() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let config = Config::new(10).sentinels(Sentinels::new("begin", "end", "quit"));
        let mut acc = BlockAccumulator::with_clock(&config, &logger, &clock).unwrap();

        feed(&mut acc, &["{", "begin", "}", "end"]);
        assert_eq!(logger.blocks()[0].commands, cmds(&["{"]));
        assert_eq!(logger.blocks()[1].commands, cmds(&["}"]));
        assert_eq!(acc.accept("quit").unwrap(), Step::EndOfStream);
        assert_eq!(acc.accept("EOF").unwrap(), Step::Continue);
    }

    #[test]
    fn invalid_config_rejected() {
        let logger = InMemoryLogger::new();
        let result = BlockAccumulator::new(&Config::new(0), &logger);
        assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));
    }

    #[test]
    fn summary_counts_lines() {
        let logger = InMemoryLogger::new();
        let clock = ManualClock::new(T0);
        let mut acc = BlockAccumulator::with_clock(&Config::new(2), &logger, &clock).unwrap();

        feed(&mut acc, &["a", "{", "b", "}", "c"]);
        let summary = acc.finalize().unwrap();
        assert_eq!(summary.lines_read, 5);
        assert_eq!(summary.blocks_flushed, 3);
        assert_eq!(summary.commands_flushed, 3);
    }

    proptest! {
        #[test]
        fn static_stream_flush_counts(block_size in 1usize..8, n in 0usize..40) {
            let logger = InMemoryLogger::new();
            let clock = ManualClock::new(T0);
            let mut acc =
                BlockAccumulator::with_clock(&Config::new(block_size), &logger, &clock).unwrap();

            let lines: Vec<String> = (0..n).map(|i| format!("cmd{i}")).collect();
            for line in &lines {
                acc.accept(line).unwrap();
            }
            prop_assert_eq!(logger.len(), n / block_size);

            acc.finalize().unwrap();
            let expected = n / block_size + usize::from(n % block_size != 0);
            prop_assert_eq!(logger.len(), expected);

            let replayed: Vec<String> =
                logger.blocks().into_iter().flat_map(|b| b.commands).collect();
            prop_assert_eq!(replayed, lines);
        }

        #[test]
        fn dynamic_block_flushes_exactly_its_commands(block_size in 1usize..5, k in 0usize..20) {
            let logger = InMemoryLogger::new();
            let clock = ManualClock::new(T0);
            let mut acc =
                BlockAccumulator::with_clock(&Config::new(block_size), &logger, &clock).unwrap();

            let inner: Vec<String> = (0..k).map(|i| format!("d{i}")).collect();
            acc.accept("{").unwrap();
            for line in &inner {
                acc.accept(line).unwrap();
            }
            prop_assert!(logger.is_empty());
            acc.accept("}").unwrap();

            if k == 0 {
                prop_assert!(logger.is_empty());
            } else {
                prop_assert_eq!(logger.len(), 1);
                prop_assert_eq!(&logger.blocks()[0].commands, &inner);
            }
        }
    }
}
