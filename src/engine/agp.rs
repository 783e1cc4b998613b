//! Hourly Percentile Profiler — Ambulatory Glucose Profile statistics.
//!
//! Buckets a multi-day reading stream by hour-of-day (local time, 0-23)
//! regardless of calendar date, then computes 10/25/50/75/90 percentile
//! bands per hour. The output is always exactly 24 entries in hour order;
//! an hour nobody slept through a sensor for carries nulls and `count: 0`.

use chrono::Timelike;

use crate::types::{HourlyStat, Reading};

/// Percentile by linear interpolation between order statistics:
/// `rank = p/100 × (n−1)`, interpolating between the readings at
/// `floor(rank)` and `ceil(rank)`.
///
/// `sorted` must be ascending and non-empty.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    debug_assert!((0.0..=100.0).contains(&p));

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = p / 100.0 * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;

    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

fn rounded_percentile(sorted: &[f64], p: f64) -> Option<i64> {
    Some(percentile(sorted, p).round() as i64)
}

/// Compute the 24-entry hourly percentile profile for a reading stream.
pub fn hourly_profile(readings: &[Reading]) -> Vec<HourlyStat> {
    let mut buckets: [Vec<f64>; 24] = Default::default();
    for reading in readings {
        buckets[reading.timestamp.hour() as usize].push(reading.value);
    }

    buckets
        .iter_mut()
        .enumerate()
        .map(|(hour, values)| {
            let hour = hour as u32;
            if values.is_empty() {
                return HourlyStat {
                    hour,
                    p10: None,
                    p25: None,
                    median: None,
                    p75: None,
                    p90: None,
                    count: 0,
                };
            }

            values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            HourlyStat {
                hour,
                p10: rounded_percentile(values, 10.0),
                p25: rounded_percentile(values, 25.0),
                median: rounded_percentile(values, 50.0),
                p75: rounded_percentile(values, 75.0),
                p90: rounded_percentile(values, 90.0),
                count: values.len(),
            }
        })
        .collect()
}
