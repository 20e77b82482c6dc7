//! NOAA/ESRL daily CO2 trend feed.
//!
//! The feed is a comma-delimited file with a block of `#` comment lines in
//! front of the header row. The number of comment lines is fixed by the
//! publisher and configured up front; when it drifts, the header row we land
//! on will not carry the expected column names and the fetch fails.

use std::path::{Path, PathBuf};
use std::time::Duration;

use csv::StringRecord;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::error::AppError;

/// Columns every feed must carry. Extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 5] = ["year", "month", "day", "smoothed", "trend"];

/// One raw data row, fields as they appear in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawRow {
    /// 1-based line number in the fetched payload.
    #[serde(skip)]
    pub line: usize,
    pub year: String,
    pub month: String,
    pub day: String,
    pub smoothed: String,
    pub trend: String,
}

/// Where the feed lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Http(String),
    File(PathBuf),
}

impl FeedSource {
    pub fn parse(location: &str) -> Result<Self, AppError> {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            return Ok(Self::Http(location.to_string()));
        }
        if let Some(path) = location.strip_prefix("file://") {
            return Ok(Self::File(PathBuf::from(path)));
        }
        if let Some((scheme, _)) = location.split_once("://") {
            return Err(AppError::Fetch(format!(
                "Unsupported feed scheme '{scheme}://' in '{location}' (use http(s):// or file://)."
            )));
        }
        Ok(Self::File(PathBuf::from(location)))
    }
}

pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Fetch(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch the feed and return its data rows, preamble and header removed.
    #[instrument(skip(self))]
    pub fn fetch_rows(&self, location: &str, preamble_lines: usize) -> Result<Vec<RawRow>, AppError> {
        let body = match FeedSource::parse(location)? {
            FeedSource::Http(url) => self.fetch_http(&url)?,
            FeedSource::File(path) => read_file(&path)?,
        };
        debug!(bytes = body.len(), "Retrieved feed payload");

        let rows = parse_feed(&body, preamble_lines)?;
        info!(rows = rows.len(), "Parsed CO2 feed");
        Ok(rows)
    }

    fn fetch_http(&self, url: &str) -> Result<String, AppError> {
        debug!("Sending HTTP request for CO2 feed");
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::Fetch(format!("Request to {url} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::Fetch(format!(
                "Request to {url} failed with status {}.",
                resp.status()
            )));
        }

        resp.text()
            .map_err(|e| AppError::Fetch(format!("Failed to read response body from {url}: {e}")))
    }
}

fn read_file(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path)
        .map_err(|e| AppError::Fetch(format!("Failed to read feed '{}': {e}", path.display())))
}

/// Skip `preamble_lines`, read the header row, and return the data rows.
pub fn parse_feed(body: &str, preamble_lines: usize) -> Result<Vec<RawRow>, AppError> {
    let mut offset = 0usize;
    for _ in 0..preamble_lines {
        match body[offset..].find('\n') {
            Some(pos) => offset += pos + 1,
            None => {
                return Err(AppError::Fetch(format!(
                    "Feed has fewer than {preamble_lines} preamble lines; no header row found."
                )));
            }
        }
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body[offset..].as_bytes());

    let raw_headers = reader
        .headers()
        .map_err(|e| AppError::Fetch(format!("Failed to read feed header row: {e}")))?
        .clone();
    let headers: StringRecord = raw_headers.iter().map(normalize_header_name).collect();
    ensure_required_columns(&headers, preamble_lines)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| AppError::Fetch(format!("Malformed feed record: {e}")))?;
        let line = preamble_lines + record.position().map_or(0, |p| p.line() as usize);
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let mut row: RawRow = record
            .deserialize(Some(&headers))
            .map_err(|e| AppError::Fetch(format!("Malformed record on line {line}: {e}")))?;
        row.line = line;
        rows.push(row);
    }

    Ok(rows)
}

fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn ensure_required_columns(headers: &StringRecord, preamble_lines: usize) -> Result<(), AppError> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(AppError::Fetch(format!(
                "Header row after {preamble_lines} preamble lines is missing column '{column}' \
                 (found: {}). Check the preamble line count.",
                headers.iter().collect::<Vec<_>>().join(",")
            )));
        }
    }
    Ok(())
}
