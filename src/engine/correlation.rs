//! Correlation Engine — cross-metric Pearson correlation on date-joined
//! daily series.
//!
//! Two independently-aggregated daily series are inner-joined on date;
//! the Pearson coefficient, a two-tailed p-value (Student's t via statrs)
//! and an ordinary-least-squares trend over the (x, y) pairs are computed
//! from the joined points only. Degenerate samples (fewer than 2 joined
//! points, zero variance) report every statistic as absent instead of NaN.

use std::collections::BTreeMap;

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::types::{CorrelationPoint, CorrelationResult, DailyMetric, DailyRecord, DayValue, TrendLine};

// ============================================================================
// Metric catalog
// ============================================================================

/// The static catalog of daily scalars usable as either axis of a
/// correlation. Each entry names where the scalar comes from: a field of a
/// typed daily record, or (for `AvgGlucose`) the Daily Aggregator applied
/// to the raw glucose stream upstream of the join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationMetric {
    RestingHr,
    Hrv,
    Spo2,
    BreathingRate,
    SkinTemp,
    Vo2Max,
    SleepScore,
    SleepEfficiency,
    SleepDuration,
    DeepSleep,
    RemSleep,
    Steps,
    Calories,
    ActiveMinutes,
    ActiveZoneMinutes,
    Stress,
    AvgGlucose,
}

impl CorrelationMetric {
    pub const ALL: [CorrelationMetric; 17] = [
        CorrelationMetric::RestingHr,
        CorrelationMetric::Hrv,
        CorrelationMetric::Spo2,
        CorrelationMetric::BreathingRate,
        CorrelationMetric::SkinTemp,
        CorrelationMetric::Vo2Max,
        CorrelationMetric::SleepScore,
        CorrelationMetric::SleepEfficiency,
        CorrelationMetric::SleepDuration,
        CorrelationMetric::DeepSleep,
        CorrelationMetric::RemSleep,
        CorrelationMetric::Steps,
        CorrelationMetric::Calories,
        CorrelationMetric::ActiveMinutes,
        CorrelationMetric::ActiveZoneMinutes,
        CorrelationMetric::Stress,
        CorrelationMetric::AvgGlucose,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            CorrelationMetric::RestingHr => "resting_hr",
            CorrelationMetric::Hrv => "hrv",
            CorrelationMetric::Spo2 => "spo2",
            CorrelationMetric::BreathingRate => "breathing_rate",
            CorrelationMetric::SkinTemp => "skin_temp",
            CorrelationMetric::Vo2Max => "vo2_max",
            CorrelationMetric::SleepScore => "sleep_score",
            CorrelationMetric::SleepEfficiency => "sleep_efficiency",
            CorrelationMetric::SleepDuration => "sleep_duration",
            CorrelationMetric::DeepSleep => "deep_sleep",
            CorrelationMetric::RemSleep => "rem_sleep",
            CorrelationMetric::Steps => "steps",
            CorrelationMetric::Calories => "calories",
            CorrelationMetric::ActiveMinutes => "active_minutes",
            CorrelationMetric::ActiveZoneMinutes => "active_zone_minutes",
            CorrelationMetric::Stress => "stress",
            CorrelationMetric::AvgGlucose => "avg_glucose",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.id() == id)
    }

    pub fn ids() -> Vec<&'static str> {
        Self::ALL.iter().map(|m| m.id()).collect()
    }

    /// The daily record kind this scalar is read from; `None` for
    /// `AvgGlucose`, which is pre-aggregated from the raw reading stream.
    pub fn source(&self) -> Option<DailyMetric> {
        match self {
            CorrelationMetric::RestingHr => Some(DailyMetric::HeartRate),
            CorrelationMetric::Hrv => Some(DailyMetric::Hrv),
            CorrelationMetric::Spo2 => Some(DailyMetric::SpO2),
            CorrelationMetric::BreathingRate => Some(DailyMetric::BreathingRate),
            CorrelationMetric::SkinTemp => Some(DailyMetric::SkinTemperature),
            CorrelationMetric::Vo2Max => Some(DailyMetric::Vo2Max),
            CorrelationMetric::SleepScore
            | CorrelationMetric::SleepEfficiency
            | CorrelationMetric::SleepDuration
            | CorrelationMetric::DeepSleep
            | CorrelationMetric::RemSleep => Some(DailyMetric::Sleep),
            CorrelationMetric::Steps
            | CorrelationMetric::Calories
            | CorrelationMetric::ActiveMinutes
            | CorrelationMetric::ActiveZoneMinutes => Some(DailyMetric::Activity),
            CorrelationMetric::Stress => Some(DailyMetric::Stress),
            CorrelationMetric::AvgGlucose => None,
        }
    }

    /// Extract this scalar from a daily record. `None` when the record is
    /// of the wrong kind or the field is unset — such days simply drop out
    /// of the series.
    pub fn scalar_from(&self, record: &DailyRecord) -> Option<f64> {
        match (self, record) {
            (CorrelationMetric::RestingHr, DailyRecord::HeartRate(r)) => {
                r.resting_heart_rate.map(|v| v as f64)
            }
            (CorrelationMetric::Hrv, DailyRecord::Hrv(r)) => r.daily_rmssd,
            (CorrelationMetric::Spo2, DailyRecord::SpO2(r)) => r.avg_spo2,
            (CorrelationMetric::BreathingRate, DailyRecord::BreathingRate(r)) => {
                Some(r.breathing_rate)
            }
            (CorrelationMetric::SkinTemp, DailyRecord::SkinTemperature(r)) => {
                Some(r.relative_temp)
            }
            (CorrelationMetric::Vo2Max, DailyRecord::Vo2Max(r)) => Some(r.vo2_max),
            (CorrelationMetric::SleepScore, DailyRecord::Sleep(r)) => {
                r.overall_score.map(|v| v as f64)
            }
            (CorrelationMetric::SleepEfficiency, DailyRecord::Sleep(r)) => {
                r.efficiency.map(|v| v as f64)
            }
            (CorrelationMetric::SleepDuration, DailyRecord::Sleep(r)) => {
                r.minutes_asleep.map(|v| v as f64)
            }
            (CorrelationMetric::DeepSleep, DailyRecord::Sleep(r)) => {
                r.deep_sleep_minutes.map(|v| v as f64)
            }
            (CorrelationMetric::RemSleep, DailyRecord::Sleep(r)) => {
                r.rem_sleep_minutes.map(|v| v as f64)
            }
            (CorrelationMetric::Steps, DailyRecord::Activity(r)) => r.steps.map(|v| v as f64),
            (CorrelationMetric::Calories, DailyRecord::Activity(r)) => {
                r.calories_total.map(|v| v as f64)
            }
            (CorrelationMetric::ActiveMinutes, DailyRecord::Activity(r)) => {
                r.minutes_very_active.map(|v| v as f64)
            }
            (CorrelationMetric::ActiveZoneMinutes, DailyRecord::Activity(r)) => {
                r.active_zone_minutes.map(|v| v as f64)
            }
            (CorrelationMetric::Stress, DailyRecord::Stress(r)) => Some(r.stress_score as f64),
            _ => None,
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Inner-join two daily series on date, ascending.
pub fn join_by_date(xs: &[DayValue], ys: &[DayValue]) -> Vec<CorrelationPoint> {
    let x_by_date: BTreeMap<_, _> = xs.iter().map(|d| (d.date, d.value)).collect();

    let mut points: Vec<CorrelationPoint> = ys
        .iter()
        .filter_map(|y| {
            x_by_date
                .get(&y.date)
                .map(|&x| CorrelationPoint { date: y.date, x, y: y.value })
        })
        .collect();

    points.sort_by_key(|p| p.date);
    points
}

/// Pearson correlation coefficient over joined points.
///
/// Formula: `r = (nΣxy − ΣxΣy) / sqrt((nΣx² − (Σx)²)(nΣy² − (Σy)²))`.
/// Absent for fewer than 2 points or a zero-variance series.
pub fn pearson(points: &[CorrelationPoint]) -> Option<f64> {
    let n = points.len();
    if n < 2 {
        return None;
    }

    let nf = n as f64;
    let sum_x: f64 = points.iter().map(|p| p.x).sum();
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    let sum_xy: f64 = points.iter().map(|p| p.x * p.y).sum();
    let sum_x2: f64 = points.iter().map(|p| p.x * p.x).sum();
    let sum_y2: f64 = points.iter().map(|p| p.y * p.y).sum();

    let numerator = nf * sum_xy - sum_x * sum_y;
    let denominator = ((nf * sum_x2 - sum_x.powi(2)) * (nf * sum_y2 - sum_y.powi(2))).sqrt();

    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }

    // Floating-point error can push |r| a hair past 1.
    Some((numerator / denominator).clamp(-1.0, 1.0))
}

/// Two-tailed p-value for a Pearson r via Student's t with n−2 degrees of
/// freedom: `t = r·sqrt(n−2) / sqrt(1−r²)`. Needs at least 3 points.
pub fn p_value_for_r(r: f64, n: usize) -> Option<f64> {
    if n < 3 {
        return None;
    }
    if r.abs() >= 0.9999 {
        return Some(0.0);
    }

    let df = (n - 2) as f64;
    let t_stat = r * df.sqrt() / (1.0 - r * r).sqrt();

    let t_dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some(2.0 * (1.0 - t_dist.cdf(t_stat.abs())))
}

fn least_squares(pairs: impl Iterator<Item = (f64, f64)> + Clone) -> Option<TrendLine> {
    let n = pairs.clone().count();
    if n < 2 {
        return None;
    }

    let nf = n as f64;
    let sum_x: f64 = pairs.clone().map(|(x, _)| x).sum();
    let sum_y: f64 = pairs.clone().map(|(_, y)| y).sum();
    let sum_xy: f64 = pairs.clone().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = pairs.map(|(x, _)| x * x).sum();

    let denominator = nf * sum_x2 - sum_x.powi(2);
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }

    let slope = (nf * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / nf;
    Some(TrendLine { slope, intercept })
}

/// OLS trend over the joined (x, y) pairs — the scatter-plot fit line.
pub fn value_trend(points: &[CorrelationPoint]) -> Option<TrendLine> {
    least_squares(points.iter().map(|p| (p.x, p.y)))
}

/// OLS trend of a single series against its sequential day index
/// (0, 1, 2, …) — the fit line for a metric-over-time chart. Not the same
/// regression as [`value_trend`], which fits value against value.
pub fn day_index_trend(values: &[DayValue]) -> Option<TrendLine> {
    least_squares(values.iter().enumerate().map(|(i, d)| (i as f64, d.value)))
}

/// Assemble the full correlation response from two fetched daily series.
pub fn correlate(x_metric: CorrelationMetric, y_metric: CorrelationMetric, xs: &[DayValue], ys: &[DayValue]) -> CorrelationResult {
    let points = join_by_date(xs, ys);
    let r = pearson(&points);
    let p_value = r.and_then(|r| p_value_for_r(r, points.len()));
    let trend = if r.is_some() { value_trend(&points) } else { None };

    CorrelationResult {
        x_metric: x_metric.id().to_string(),
        y_metric: y_metric.id().to_string(),
        r,
        p_value,
        trend,
        points,
        available_metrics: CorrelationMetric::ids(),
    }
}
