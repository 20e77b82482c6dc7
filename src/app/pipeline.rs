//! The daily chart pipeline.
//!
//! fetch -> normalize -> monthly means -> display window -> anchors -> render -> write
//!
//! [`prepare`] is the pure data half and takes already-fetched rows, so tests
//! can drive it with fixed input and a fixed "today".

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::config::Config;
use crate::data::{FeedClient, RawRow};
use crate::domain::{DisplayWindow, PreparedSeries};
use crate::error::AppError;
use crate::prep::{AnchorPolicy, apply_monthly_means, apply_window, normalize, select_anchors};
use crate::render::{ChartInput, ChartRenderer};

/// Outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub prepared: PreparedSeries,
    pub image_path: PathBuf,
}

/// Turn raw feed rows into the windowed series and its anchors.
pub fn prepare(
    rows: &[RawRow],
    today: NaiveDate,
    lookback_years: u32,
    policy: &dyn AnchorPolicy,
) -> Result<PreparedSeries, AppError> {
    let mut series = normalize(rows)?;

    // Means come from the full series, so a month cut by the window start keeps
    // its whole-month value.
    let mut monthly = apply_monthly_means(&mut series);
    debug!(months = monthly.len(), "Computed monthly means");

    let window = DisplayWindow::trailing_years(today, lookback_years);
    apply_window(&mut series, &window)?;
    monthly.retain(|m| window.contains(m.month_end));

    let anchors = select_anchors(&series, policy)?;

    Ok(PreparedSeries {
        series,
        monthly,
        window,
        anchors,
    })
}

/// Fetch the feed, then prepare, render and write the chart for `today`.
pub fn run_once(
    config: &Config,
    today: NaiveDate,
    policy: &dyn AnchorPolicy,
    renderer: &dyn ChartRenderer,
) -> Result<RunOutput, AppError> {
    let client = FeedClient::new(config.fetch_timeout)?;
    let rows = client.fetch_rows(&config.feed_url, config.preamble_lines)?;
    run_with_rows(config, &rows, today, policy, renderer)
}

/// Everything after the fetch.
pub fn run_with_rows(
    config: &Config,
    rows: &[RawRow],
    today: NaiveDate,
    policy: &dyn AnchorPolicy,
    renderer: &dyn ChartRenderer,
) -> Result<RunOutput, AppError> {
    let prepared = prepare(rows, today, config.lookback_years, policy)?;

    let anchors = &prepared.anchors;
    info!(
        window_start = %prepared.window.start,
        window_end = %prepared.window.end,
        records = prepared.series.len(),
        yesterday = %anchors.yesterday.record.date,
        yesterday_ppm = anchors.yesterday.record.smoothed,
        year_ago = %anchors.year_ago.record.date,
        year_ago_ppm = anchors.year_ago.record.smoothed,
        change_ppm = anchors.smoothed_change(),
        "Prepared CO2 series"
    );

    let bytes = renderer.render(&ChartInput {
        prepared: &prepared,
        generated: today,
    })?;
    let image_path = crate::io::write_image(&config.output_dir, today, renderer.file_extension(), &bytes)?;

    Ok(RunOutput {
        prepared,
        image_path,
    })
}
