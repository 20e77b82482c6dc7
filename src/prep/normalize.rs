//! Raw feed rows -> date-indexed daily series.

use chrono::NaiveDate;
use tracing::debug;

use crate::data::RawRow;
use crate::domain::{DailyRecord, Series};
use crate::error::AppError;

/// Turn raw rows into a [`Series`] sorted by date.
///
/// The `year`/`month`/`day` columns become the record date and are not kept.
/// Any unparseable field or repeated date fails the whole series.
pub fn normalize(rows: &[RawRow]) -> Result<Series, AppError> {
    let mut records = rows.iter().map(parse_row).collect::<Result<Vec<_>, _>>()?;

    records.sort_by_key(|r| r.date);
    if let Some(pair) = records.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(AppError::Parse(format!("Duplicate date {} in feed.", pair[0].date)));
    }

    if let (Some(first), Some(last)) = (records.first(), records.last()) {
        debug!(records = records.len(), first = %first.date, last = %last.date, "Normalized daily series");
    }

    Ok(Series::from_sorted(records))
}

fn parse_row(row: &RawRow) -> Result<DailyRecord, AppError> {
    let date = parse_date(row)?;
    let smoothed = parse_value(&row.smoothed, "smoothed", row.line)?;
    let trend = parse_value(&row.trend, "trend", row.line)?;
    Ok(DailyRecord::new(date, smoothed, trend))
}

fn parse_date(row: &RawRow) -> Result<NaiveDate, AppError> {
    let bad = |what: &str| {
        AppError::Parse(format!(
            "Invalid {what} on line {} (year='{}', month='{}', day='{}').",
            row.line, row.year, row.month, row.day
        ))
    };

    let year = row.year.trim().parse::<i32>().map_err(|_| bad("year"))?;
    let month = row.month.trim().parse::<u32>().map_err(|_| bad("month"))?;
    let day = row.day.trim().parse::<u32>().map_err(|_| bad("day"))?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| bad("date"))
}

fn parse_value(raw: &str, column: &str, line: usize) -> Result<f64, AppError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| AppError::Parse(format!("Invalid {column} '{raw}' on line {line}: {e}")))?;
    if !value.is_finite() {
        return Err(AppError::Parse(format!("Non-finite {column} '{raw}' on line {line}.")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(line: usize, ymd: (&str, &str, &str), smoothed: &str, trend: &str) -> RawRow {
        RawRow {
            line,
            year: ymd.0.to_string(),
            month: ymd.1.to_string(),
            day: ymd.2.to_string(),
            smoothed: smoothed.to_string(),
            trend: trend.to_string(),
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn builds_date_index() {
        let rows = vec![
            row(1, ("2023", "1", "1"), "420.0", "419.5"),
            row(2, ("2023", "1", "2"), "421.0", "419.6"),
        ];
        let series = normalize(&rows).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.records()[0].date, d(2023, 1, 1));
        assert_eq!(series.records()[1].smoothed, 421.0);
        assert_eq!(series.records()[1].trend, 419.6);
        assert!(series.records().iter().all(|r| r.monthly_mean.is_none()));
    }

    #[test]
    fn output_is_strictly_ascending() {
        let rows = vec![
            row(1, ("2023", "3", "1"), "422.0", "420.0"),
            row(2, ("2022", "12", "31"), "419.0", "418.0"),
            row(3, ("2023", "1", "15"), "420.0", "419.0"),
        ];
        let series = normalize(&rows).unwrap();
        assert!(series.records().windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(series.first().unwrap().date, d(2022, 12, 31));
        assert_eq!(series.last().unwrap().date, d(2023, 3, 1));
    }

    #[test]
    fn duplicate_date_is_rejected() {
        let rows = vec![
            row(1, ("2023", "1", "1"), "420.0", "419.5"),
            row(2, ("2023", "01", "01"), "420.1", "419.5"),
        ];
        let err = normalize(&rows).unwrap_err();
        assert!(matches!(err, AppError::Parse(ref msg) if msg.contains("2023-01-01")));
    }

    #[test]
    fn bad_date_fails_whole_series() {
        let rows = vec![
            row(1, ("2023", "1", "1"), "420.0", "419.5"),
            row(7, ("2023", "2", "30"), "420.0", "419.5"),
        ];
        let err = normalize(&rows).unwrap_err();
        match err {
            AppError::Parse(msg) => assert!(msg.contains("line 7"), "{msg}"),
            other => panic!("expected Parse error, got {other:?}"),
        }

        let rows = vec![row(3, ("twenty", "1", "1"), "420.0", "419.5")];
        assert!(matches!(normalize(&rows), Err(AppError::Parse(_))));
    }

    #[test]
    fn bad_value_fails_whole_series() {
        let rows = vec![row(4, ("2023", "1", "1"), "-", "419.5")];
        let err = normalize(&rows).unwrap_err();
        assert!(matches!(err, AppError::Parse(ref msg) if msg.contains("smoothed")));

        let rows = vec![row(4, ("2023", "1", "1"), "420.0", "NaN")];
        assert!(matches!(normalize(&rows), Err(AppError::Parse(_))));
    }

    #[test]
    fn empty_input_is_empty_series() {
        assert!(normalize(&[]).unwrap().is_empty());
    }
}
