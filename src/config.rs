//! Run configuration.
//!
//! The daily job takes no CLI flags and needs no configuration: every field
//! defaults to the reference run (NOAA feed, 60 preamble lines, 10 years,
//! `figures/`). The `CO2_*` environment variables (optionally from `.env`) are
//! an extension on top of that for pointing the job at a mirror, a local file
//! or another output directory. Leaving them all unset reproduces the
//! reference run exactly.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

/// HTTPS mirror of the NOAA/ESRL global daily trend file.
pub const DEFAULT_FEED_URL: &str = "https://gml.noaa.gov/webdata/ccgg/trends/co2/co2_trend_gl.csv";
/// Descriptive comment lines before the header row.
pub const DEFAULT_PREAMBLE_LINES: usize = 60;
pub const DEFAULT_LOOKBACK_YEARS: u32 = 10;
pub const DEFAULT_OUTPUT_DIR: &str = "figures";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub preamble_lines: usize,
    pub lookback_years: u32,
    pub output_dir: PathBuf,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            preamble_lines: DEFAULT_PREAMBLE_LINES,
            lookback_years: DEFAULT_LOOKBACK_YEARS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            feed_url: get("CO2_FEED_URL").unwrap_or(defaults.feed_url),
            preamble_lines: parse_var(&get, "CO2_PREAMBLE_LINES")?.unwrap_or(defaults.preamble_lines),
            lookback_years: parse_var(&get, "CO2_LOOKBACK_YEARS")?.unwrap_or(defaults.lookback_years),
            output_dir: get("CO2_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            fetch_timeout: parse_var(&get, "CO2_FETCH_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.fetch_timeout),
        })
    }
}

fn parse_var<T, G>(get: &G, key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::Config(format!("{key}='{raw}': {e}"))),
    }
}
