//! Monthly mean of the smoothed reading, broadcast back onto each day.
//!
//! Two passes: first one mean per month bucket, then a lookup per record.

use std::collections::BTreeMap;

use crate::domain::{MonthKey, MonthlyMean, Series};

/// Mean of `smoothed` for every month present in `series`, oldest first.
pub fn monthly_means(series: &Series) -> Vec<MonthlyMean> {
    let mut buckets: BTreeMap<MonthKey, (f64, usize)> = BTreeMap::new();
    for record in series.records() {
        let entry = buckets.entry(MonthKey::of(record.date)).or_insert((0.0, 0));
        entry.0 += record.smoothed;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(key, (sum, days))| MonthlyMean {
            month_end: key.month_end(),
            mean: sum / days as f64,
            days,
        })
        .collect()
}

/// Set `monthly_mean` on every record and return the per-month values.
pub fn apply_monthly_means(series: &mut Series) -> Vec<MonthlyMean> {
    let monthly = monthly_means(series);
    let lookup: BTreeMap<MonthKey, f64> = monthly
        .iter()
        .map(|m| (MonthKey::of(m.month_end), m.mean))
        .collect();

    for record in series.records_mut() {
        record.monthly_mean = lookup.get(&MonthKey::of(record.date)).copied();
    }

    monthly
}
