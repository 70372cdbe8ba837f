//! Textual block format.
//!
//! A block is rendered as a single line: the tag, then every command
//! followed by the separator.
//!
//! ```text
//! bulk: cmd1, cmd2, cmd3,
//! ```

use crate::timestamp::Timestamp;

/// Tag that prefixes every rendered block.
pub const BLOCK_TAG: &str = "bulk: ";

/// Text written after every command, including the last one.
pub const SEPARATOR: &str = ", ";

/// Renders a block as one line, without the trailing newline.
#[must_use]
pub fn render_block(commands: &[String]) -> String {
    let capacity = BLOCK_TAG.len()
        + commands
            .iter()
            .map(|cmd| cmd.len() + SEPARATOR.len())
            .sum::<usize>();

    let mut line = String::with_capacity(capacity);
    line.push_str(BLOCK_TAG);
    for cmd in commands {
        line.push_str(cmd);
        line.push_str(SEPARATOR);
    }
    line
}

/// Returns the log file name for a block stamped with `timestamp`.
#[must_use]
pub fn log_file_name(timestamp: &Timestamp) -> String {
    format!("bulk{timestamp}.log")
}
