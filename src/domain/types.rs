//! Shared domain types.
//!
//! A [`Series`] is built once per run, filled in by the aggregation pass and
//! then narrowed to the display window. Everything downstream of the window
//! (anchors, renderer input) only reads it.

use chrono::{Datelike, Months, NaiveDate};

/// One day of the feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// Short-term smoothed reading (ppm).
    pub smoothed: f64,
    /// Long-run trend (ppm).
    pub trend: f64,
    /// Mean of `smoothed` over the record's calendar month.
    ///
    /// `None` until the aggregation pass runs.
    pub monthly_mean: Option<f64>,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, smoothed: f64, trend: f64) -> Self {
        Self {
            date,
            smoothed,
            trend,
            monthly_mean: None,
        }
    }
}

/// Daily records in strictly increasing date order.
///
/// Days missing from the feed stay missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    records: Vec<DailyRecord>,
}

impl Series {
    /// Wrap records that are already sorted and free of duplicate dates.
    pub(crate) fn from_sorted(records: Vec<DailyRecord>) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].date < w[1].date));
        Self { records }
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [DailyRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&DailyRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&DailyRecord> {
        self.records.last()
    }

    /// Drop every record outside `window`.
    pub fn retain_window(&mut self, window: &DisplayWindow) {
        self.records.retain(|r| window.contains(r.date));
    }
}

/// Identifies a calendar month by its last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        // Day 1 always exists, and one month past it minus a day is the month end.
        let first = date.with_day(1).unwrap_or(date);
        let month_end = first
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(date);
        Self(month_end)
    }

    pub fn month_end(&self) -> NaiveDate {
        self.0
    }
}

/// Mean of `smoothed` over one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyMean {
    /// Label date of the month bucket (its last calendar day).
    pub month_end: NaiveDate,
    pub mean: f64,
    /// Number of daily records in the bucket.
    pub days: usize,
}

/// Inclusive date range kept for charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DisplayWindow {
    /// The trailing `years` ending on `today`.
    ///
    /// On Feb 29 the start clamps to Feb 28 when the target year is not a
    /// leap year.
    pub fn trailing_years(today: NaiveDate, years: u32) -> Self {
        let start = today
            .checked_sub_months(Months::new(years.saturating_mul(12)))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A record singled out for highlighting, with its position in the
/// windowed series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPoint {
    pub index: usize,
    pub record: DailyRecord,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchors {
    pub yesterday: AnchorPoint,
    pub year_ago: AnchorPoint,
}

impl Anchors {
    /// Change in the smoothed reading between the two anchors (ppm).
    pub fn smoothed_change(&self) -> f64 {
        self.yesterday.record.smoothed - self.year_ago.record.smoothed
    }
}

/// Everything the core hands to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSeries {
    /// Windowed series with `monthly_mean` filled in.
    pub series: Series,
    /// Month buckets intersecting the window, stamped on their month-end date.
    pub monthly: Vec<MonthlyMean>,
    pub window: DisplayWindow,
    pub anchors: Anchors,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_key_is_last_day_of_month() {
        assert_eq!(MonthKey::of(d(2023, 1, 15)).month_end(), d(2023, 1, 31));
        assert_eq!(MonthKey::of(d(2024, 2, 1)).month_end(), d(2024, 2, 29));
        assert_eq!(MonthKey::of(d(2023, 2, 28)).month_end(), d(2023, 2, 28));
        assert_eq!(MonthKey::of(d(2023, 12, 31)).month_end(), d(2023, 12, 31));
    }

    #[test]
    fn trailing_window_reduces_year() {
        let window = DisplayWindow::trailing_years(d(2026, 10, 19), 10);
        assert_eq!(window.start, d(2016, 10, 19));
        assert_eq!(window.end, d(2026, 10, 19));
        assert!(window.contains(d(2016, 10, 19)));
        assert!(window.contains(d(2026, 10, 19)));
        assert!(!window.contains(d(2016, 10, 18)));
        assert!(!window.contains(d(2026, 10, 20)));
    }

    #[test]
    fn trailing_window_clamps_leap_day() {
        let window = DisplayWindow::trailing_years(d(2024, 2, 29), 1);
        assert_eq!(window.start, d(2023, 2, 28));

        // Leap year to leap year keeps the day.
        let window = DisplayWindow::trailing_years(d(2024, 2, 29), 4);
        assert_eq!(window.start, d(2020, 2, 29));
    }

    #[test]
    fn retain_window_keeps_inclusive_range() {
        let mut series = Series::from_sorted(vec![
            DailyRecord::new(d(2020, 1, 1), 410.0, 409.0),
            DailyRecord::new(d(2021, 1, 1), 412.0, 411.0),
            DailyRecord::new(d(2022, 1, 1), 414.0, 413.0),
            DailyRecord::new(d(2023, 1, 1), 416.0, 415.0),
        ]);
        let window = DisplayWindow {
            start: d(2021, 1, 1),
            end: d(2022, 1, 1),
        };
        series.retain_window(&window);
        let dates: Vec<_> = series.records().iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![d(2021, 1, 1), d(2022, 1, 1)]);
    }
}
