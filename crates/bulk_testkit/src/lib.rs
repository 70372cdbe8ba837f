//! # Bulk Testkit
//!
//! Test utilities for bulk.
//!
//! This crate provides:
//! - Fixtures: temporary log directories with a captured echo sink
//! - Property-based generators for command streams using proptest
//! - A reference model of the expected block sequence
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bulk_testkit::prelude::*;
//!
//! #[test]
//! fn blocks_land_on_disk() {
//!     let dir = TestLogDir::new();
//!     let logger = dir.logger();
//!     // ... drive an accumulator with `logger`
//!     assert_eq!(dir.log_files().len(), 1);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod model;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::model::*;
}

pub use fixtures::*;
pub use generators::*;
pub use model::*;
