//! # Bulk Core
//!
//! Block accumulation engine for bulk.
//!
//! This crate provides:
//! - [`BlockAccumulator`], the state machine that groups command lines into
//!   static (size-bounded) and dynamic (delimiter-bounded) blocks
//! - [`Session`], which drives an accumulator from any `BufRead`
//! - [`Config`] and [`Sentinels`] with validation
//! - [`Clock`] implementations for block timestamps
//!
//! The core performs no I/O of its own: completed blocks go to a
//! [`bulk_log::BlockLogger`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod accumulator;
mod clock;
mod config;
mod error;
mod session;
mod stats;

pub use accumulator::{BlockAccumulator, Mode, Step};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    parse_block_size, Config, Sentinels, DEFAULT_CLOSE, DEFAULT_OPEN, DEFAULT_TERMINATOR,
};
pub use error::{CoreError, CoreResult};
pub use session::Session;
pub use stats::Summary;
