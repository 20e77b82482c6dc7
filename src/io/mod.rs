//! Output helpers.
//!
//! - dated chart file writer (`output`)

pub mod output;

pub use output::*;
