//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - daily feed records and the ordered `Series`
//! - month buckets (`MonthKey`, `MonthlyMean`)
//! - the display window and the highlighted anchors

pub mod types;

pub use types::*;
