//! Display window and anchor selection.
//!
//! The year-ago anchor is chosen by a pluggable [`AnchorPolicy`]. The default,
//! [`PositionalOffset`], counts rows back from the last record rather than
//! looking up a calendar date, so gaps in the feed move it off the true
//! anniversary. [`CalendarOffset`] is the calendar-correct alternative.

use chrono::{Months, NaiveDate};
use tracing::debug;

use crate::domain::{AnchorPoint, Anchors, DailyRecord, DisplayWindow, Series};
use crate::error::AppError;

/// Rows between the year-ago anchor and the end of the window, inclusive of
/// both ends.
pub const YEAR_AGO_ROWS: usize = 366;

/// Picks the index of the year-ago record in a non-empty windowed series.
pub trait AnchorPolicy {
    fn year_ago_index(&self, records: &[DailyRecord]) -> Result<usize, AppError>;
}

/// The record `rows` positions from the end (`len - rows`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionalOffset {
    pub rows: usize,
}

impl Default for PositionalOffset {
    fn default() -> Self {
        Self { rows: YEAR_AGO_ROWS }
    }
}

impl AnchorPolicy for PositionalOffset {
    fn year_ago_index(&self, records: &[DailyRecord]) -> Result<usize, AppError> {
        // `rows == 0` would point one past the last record.
        if self.rows == 0 {
            return Err(AppError::Config(
                "Year-ago row offset must be at least 1.".to_string(),
            ));
        }
        records
            .len()
            .checked_sub(self.rows)
            .ok_or(AppError::InsufficientHistory {
                required: self.rows,
                available: records.len(),
            })
    }
}

/// The latest record dated on or before the last record's date minus `years`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarOffset {
    pub years: u32,
}

impl Default for CalendarOffset {
    fn default() -> Self {
        Self { years: 1 }
    }
}

impl AnchorPolicy for CalendarOffset {
    fn year_ago_index(&self, records: &[DailyRecord]) -> Result<usize, AppError> {
        let (Some(first), Some(last)) = (records.first(), records.last()) else {
            return Err(AppError::InsufficientHistory {
                required: 1,
                available: 0,
            });
        };
        let target = last
            .date
            .checked_sub_months(Months::new(self.years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);
        let missing = || AppError::MissingAnniversary {
            target,
            earliest: first.date,
        };

        // Records are sorted, so this is the count of records on or before `target`.
        let after = records.partition_point(|r| r.date <= target);
        after.checked_sub(1).ok_or_else(missing)
    }
}

/// Narrow `series` to `window` in place.
///
/// Fails when nothing is left, before any anchor work is attempted.
pub fn apply_window(series: &mut Series, window: &DisplayWindow) -> Result<(), AppError> {
    let before = series.len();
    series.retain_window(window);
    debug!(
        start = %window.start,
        end = %window.end,
        kept = series.len(),
        dropped = before - series.len(),
        "Applied display window"
    );

    if series.is_empty() {
        return Err(AppError::EmptyWindow {
            start: window.start,
            end: window.end,
        });
    }
    Ok(())
}

/// `yesterday` is the last record; `year_ago` comes from `policy`.
pub fn select_anchors(series: &Series, policy: &dyn AnchorPolicy) -> Result<Anchors, AppError> {
    let records = series.records();
    let last_index = records
        .len()
        .checked_sub(1)
        .ok_or(AppError::InsufficientHistory {
            required: YEAR_AGO_ROWS,
            available: 0,
        })?;
    let year_ago_index = policy.year_ago_index(records)?;
    let year_ago = records
        .get(year_ago_index)
        .copied()
        .ok_or(AppError::InsufficientHistory {
            required: year_ago_index.saturating_add(1),
            available: records.len(),
        })?;

    Ok(Anchors {
        yesterday: AnchorPoint {
            index: last_index,
            record: records[last_index],
        },
        year_ago: AnchorPoint {
            index: year_ago_index,
            record: year_ago,
        },
    })
}
