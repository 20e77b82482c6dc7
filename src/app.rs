//! Top-level application orchestration.
//!
//! `src/main.rs` only sets up logging and maps errors to exit codes; this
//! module is the "real main" that:
//! - loads configuration
//! - runs the daily chart pipeline for today's date
//! - reports where the chart was written

use chrono::Local;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::AppError;
use crate::prep::PositionalOffset;
use crate::render::PngChartRenderer;

pub mod pipeline;

/// Entry point for the `co2` binary.
#[instrument]
pub fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    info!(?config, "Starting CO2 chart run");

    let today = Local::now().date_naive();
    let output = pipeline::run_once(
        &config,
        today,
        &PositionalOffset::default(),
        &PngChartRenderer::default(),
    )?;

    info!(path = %output.image_path.display(), "CO2 chart complete");
    println!("{}", output.image_path.display());
    Ok(())
}
