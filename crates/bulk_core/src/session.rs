//! Driving an accumulator from a line source.

use crate::accumulator::{BlockAccumulator, Step};
use crate::clock::Clock;
use crate::error::CoreResult;
use crate::stats::Summary;
use bulk_log::BlockLogger;
use std::borrow::Cow;
use std::io::BufRead;
use tracing::{debug, warn};

/// Strips the line ending and decodes the bytes, replacing invalid UTF-8.
fn decode_line(buf: &[u8], line: u64) -> Cow<'_, str> {
    let mut bytes = buf;
    if let Some(rest) = bytes.strip_suffix(b"\n") {
        bytes = rest.strip_suffix(b"\r").unwrap_or(rest);
    }

    let text = String::from_utf8_lossy(bytes);
    if let Cow::Owned(_) = text {
        warn!(line, "input line is not valid UTF-8, decoded lossily");
    }
    text
}

/// Feeds every line of a reader into an accumulator, then finalizes it.
#[derive(Debug)]
pub struct Session<L, C> {
    accumulator: BlockAccumulator<L, C>,
}

impl<L: BlockLogger, C: Clock> Session<L, C> {
    /// Wraps an accumulator.
    #[must_use]
    pub fn new(accumulator: BlockAccumulator<L, C>) -> Self {
        Self { accumulator }
    }

    /// Reads lines until the terminator or end of input and flushes the
    /// remainder.
    ///
    /// Line endings (`\n` or `\r\n`) are stripped before matching. A line
    /// that is not valid UTF-8 is decoded lossily and still processed.
    ///
    /// # Errors
    ///
    /// - [`crate::CoreError::Io`] if the reader fails
    /// - [`crate::CoreError::UnbalancedClose`] on a stray close delimiter
    /// - [`crate::CoreError::UnclosedBlock`] if input ends inside a block
    ///
    /// On the first two, reading stops and the run is aborted: a pending
    /// static block is still flushed, anything left unlogged is counted in
    /// [`Summary::commands_dropped`].
    pub fn run<R: BufRead>(&mut self, mut reader: R) -> CoreResult<Summary> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    self.accumulator.abort();
                    return Err(e.into());
                }
            }

            let line = decode_line(&buf, self.accumulator.summary().lines_read + 1);
            match self.accumulator.accept(&line) {
                Ok(Step::Continue) => {}
                Ok(Step::EndOfStream) => break,
                Err(e) => {
                    self.accumulator.abort();
                    return Err(e);
                }
            }
        }

        let summary = self.accumulator.finalize()?;
        debug!(
            blocks = summary.blocks_flushed,
            commands = summary.commands_flushed,
            "input processed"
        );
        Ok(summary)
    }

    /// Returns the wrapped accumulator.
    #[must_use]
    pub fn accumulator(&self) -> &BlockAccumulator<L, C> {
        &self.accumulator
    }

    /// Unwraps the session.
    #[must_use]
    pub fn into_inner(self) -> BlockAccumulator<L, C> {
        self.accumulator
    }
}
