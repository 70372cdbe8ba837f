//! # Bulk Log
//!
//! Block logger trait and implementations for bulk.
//!
//! This crate provides the output side of bulk. A logger receives one
//! complete block (a timestamp plus the commands accumulated under it) and
//! publishes it. Loggers never decide *when* a block is complete; that is
//! owned by `bulk_core`.
//!
//! ## Design Principles
//!
//! - Loggers are dumb sinks (write one block, report success or failure)
//! - Commands are opaque text and are written verbatim, in order
//! - Must be `Send + Sync` so a logger can be shared behind a handle
//! - An empty block is never written
//!
//! ## Available Loggers
//!
//! - [`InMemoryLogger`] - Records blocks, for testing
//! - [`FileLogger`] - Writes each block to a sink and to `bulk<ts>.log`
//!
//! ## Example
//!
//! ```rust
//! use bulk_log::{BlockLogger, InMemoryLogger, Timestamp};
//!
//! let logger = InMemoryLogger::new();
//! let commands = vec!["cmd1".to_string(), "cmd2".to_string()];
//! logger.write(&Timestamp::from_secs(1700000000), &commands).unwrap();
//! assert_eq!(logger.blocks()[0].commands, commands);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod format;
mod logger;
mod memory;
mod timestamp;

pub use error::{LogError, LogResult};
pub use file::FileLogger;
pub use format::{log_file_name, render_block, BLOCK_TAG, SEPARATOR};
pub use logger::BlockLogger;
pub use memory::{InMemoryLogger, LoggedBlock};
pub use timestamp::Timestamp;
