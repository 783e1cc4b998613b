//! Range Classifier — time-in-range statistics for glucose readings.
//!
//! Partitions a flat set of reading values against a configurable target
//! band: below `low` / inside `[low, high]` / above `high`. Two fixed
//! clinical sub-thresholds (very low <54, very high >250 mg/dL) are
//! counted on top of that partition without subtraction, so a 52 mg/dL
//! reading appears in both `low_percent` and `very_low_percent`. Only
//! `in_range + low + high` is a true partition summing to 100.

use crate::types::RangeBreakdown;

/// Clinically severe hypoglycemia boundary (mg/dL), not operator-tunable.
pub const VERY_LOW_MG_DL: f64 = 54.0;

/// Clinically severe hyperglycemia boundary (mg/dL), not operator-tunable.
pub const VERY_HIGH_MG_DL: f64 = 250.0;

fn percent_of(count: usize, total: usize) -> f64 {
    // One decimal place for display.
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Classify reading values against `[low, high]` and produce the
/// percentage breakdown.
///
/// Zero readings is a defined result — all percentages 0, `total_readings`
/// 0 — never a division by zero.
pub fn classify(values: &[f64], low: f64, high: f64) -> RangeBreakdown {
    let total = values.len();
    if total == 0 {
        return RangeBreakdown {
            total_readings: 0,
            in_range_percent: 0.0,
            low_percent: 0.0,
            high_percent: 0.0,
            very_low_percent: 0.0,
            very_high_percent: 0.0,
        };
    }

    let low_count = values.iter().filter(|&&v| v < low).count();
    let high_count = values.iter().filter(|&&v| v > high).count();
    let very_low_count = values.iter().filter(|&&v| v < VERY_LOW_MG_DL).count();
    let very_high_count = values.iter().filter(|&&v| v > VERY_HIGH_MG_DL).count();
    let in_range_count = total - low_count - high_count;

    RangeBreakdown {
        total_readings: total,
        in_range_percent: percent_of(in_range_count, total),
        low_percent: percent_of(low_count, total),
        high_percent: percent_of(high_count, total),
        very_low_percent: percent_of(very_low_count, total),
        very_high_percent: percent_of(very_high_count, total),
    }
}
