//! `co2-trend` library crate.
//!
//! The binary (`co2`) is a thin wrapper around this library so that:
//!
//! - the data pipeline is testable without network access or spawning processes
//! - rendering stays behind a trait and can be swapped or skipped in tests

pub mod app;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod prep;
pub mod render;
