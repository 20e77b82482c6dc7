//! Persist the rendered chart.
//!
//! One file per calendar day: `<dir>/<YYYY-MM-DD>.<ext>`. A second run on the
//! same day overwrites the first.

use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::error::AppError;

pub fn image_path(dir: &Path, date: NaiveDate, extension: &str) -> PathBuf {
    dir.join(format!("{}.{extension}", date.format("%Y-%m-%d")))
}

/// Write `bytes` to the chart file for `date`, creating `dir` if needed.
pub fn write_image(dir: &Path, date: NaiveDate, extension: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::Output(format!("Failed to create output dir '{}': {e}", dir.display())))?;

    let path = image_path(dir, date, extension);
    fs::write(&path, bytes)
        .map_err(|e| AppError::Output(format!("Failed to write chart '{}': {e}", path.display())))?;

    info!(path = %path.display(), bytes = bytes.len(), "Wrote chart");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_is_named_by_date() {
        let path = image_path(Path::new("figures"), NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(), "svg");
        assert_eq!(path, PathBuf::from("figures/2026-03-07.svg"));
    }

    #[test]
    fn same_day_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("figures");
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let first = write_image(&out, date, "svg", b"first").unwrap();
        let second = write_image(&out, date, "svg", b"second run").unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"second run");
        assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
    }
}
