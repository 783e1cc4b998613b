//! Daily Aggregator — per-calendar-day summary statistics.
//!
//! Reduces a timestamp-ordered reading sequence into one
//! [`DailySummary`] per date that has at least one reading. Days without
//! readings are never emitted; there are no zero-filled gaps.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{DailySummary, DayValue, Reading};

/// Round half-up to the nearest whole unit, the display convention for
/// glucose-style metrics (100.5 → 101, 100.4 → 100).
pub(crate) fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

fn group_by_date(readings: &[Reading]) -> BTreeMap<NaiveDate, Vec<f64>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for reading in readings {
        by_date.entry(reading.timestamp.date()).or_default().push(reading.value);
    }
    by_date
}

/// Summarize readings into per-day avg/min/max/count, date ascending.
///
/// Empty input yields an empty sequence, not an error.
pub fn daily_summaries(readings: &[Reading]) -> Vec<DailySummary> {
    group_by_date(readings)
        .into_iter()
        .map(|(date, values)| {
            let count = values.len();
            let sum: f64 = values.iter().sum();
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            DailySummary {
                date,
                avg: round_half_up(sum / count as f64),
                min,
                max,
                count,
            }
        })
        .collect()
}

/// Reduce an intraday stream to one mean value per date — the
/// pre-aggregation applied to raw streams before a correlation join.
/// Uses the same rounding as [`daily_summaries`] so both views of a day
/// agree.
pub fn daily_means(readings: &[Reading]) -> Vec<DayValue> {
    daily_summaries(readings)
        .into_iter()
        .map(|s| DayValue { date: s.date, value: s.avg as f64 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn reading(ts: &str, value: f64) -> Reading {
        Reading {
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap(),
            value,
        }
    }

    #[test]
    fn test_single_day_summary() {
        // Four readings on one date: avg 100, min 70, max 150, count 4
        let readings = [
            reading("2024-01-15 08:00:00", 70.0),
            reading("2024-01-15 12:00:00", 100.0),
            reading("2024-01-15 18:00:00", 150.0),
            reading("2024-01-15 22:00:00", 80.0),
        ];

        let summaries = daily_summaries(&readings);
        assert_eq!(summaries.len(), 1);
        let day = &summaries[0];
        assert_eq!(day.avg, 100);
        assert_eq!(day.min, 70.0);
        assert_eq!(day.max, 150.0);
        assert_eq!(day.count, 4);
    }

    #[test]
    fn test_multiple_days_ordered_no_gaps_emitted() {
        // Readings on the 16th and 14th only — the 15th must not appear
        let readings = [
            reading("2024-01-16 12:00:00", 90.0),
            reading("2024-01-16 18:00:00", 110.0),
            reading("2024-01-14 12:00:00", 100.0),
        ];

        let summaries = daily_summaries(&readings);
        assert_eq!(summaries.len(), 2, "zero-reading days are omitted");
        assert_eq!(summaries[0].date.to_string(), "2024-01-14");
        assert_eq!(summaries[1].date.to_string(), "2024-01-16");
        assert_eq!(summaries[1].avg, 100);
    }

    #[test]
    fn test_rounding_is_half_up() {
        let readings = [
            reading("2024-01-15 08:00:00", 100.0),
            reading("2024-01-15 09:00:00", 101.0),
        ];
        // mean 100.5 rounds up to 101
        assert_eq!(daily_summaries(&readings)[0].avg, 101);

        assert_eq!(round_half_up(100.4), 100);
        assert_eq!(round_half_up(100.5), 101);
        assert_eq!(round_half_up(99.999), 100);
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        assert!(daily_summaries(&[]).is_empty());
        assert!(daily_means(&[]).is_empty());
    }

    #[test]
    fn test_duplicate_timestamps_both_count() {
        let readings = [
            reading("2024-01-15 08:00:00", 90.0),
            reading("2024-01-15 08:00:00", 110.0),
        ];
        let day = &daily_summaries(&readings)[0];
        assert_eq!(day.count, 2, "duplicates contribute independently");
        assert_eq!(day.avg, 100);
    }

    #[test]
    fn test_daily_means_match_summary_avg() {
        let readings = [
            reading("2024-01-15 08:00:00", 71.0),
            reading("2024-01-15 09:00:00", 72.0),
            reading("2024-01-16 08:00:00", 130.0),
        ];
        let means = daily_means(&readings);
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].value, 72.0, "71.5 rounds half-up to 72");
        assert_eq!(means[1].value, 130.0);
    }

    #[test]
    fn test_idempotent() {
        let readings = [
            reading("2024-01-15 08:00:00", 70.0),
            reading("2024-01-15 12:00:00", 100.0),
        ];
        assert_eq!(daily_summaries(&readings), daily_summaries(&readings));
    }
}
