//! Core data model for the health dashboard.
//!
//! Everything here is a plain serde-serializable value type. The statistics
//! in [`crate::engine`] operate on borrowed slices of these; the store owns
//! the persisted copies. All derived summary types (daily summaries, range
//! breakdowns, AGP profiles, correlation results) are recomputed per request
//! and never persisted.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// Raw readings
// ============================================================================

/// A single raw timestamped measurement (one glucose value, one HR sample).
///
/// Timestamps are naive local time — wearable exports report wall-clock time
/// of the wearer, not UTC.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// One scalar per calendar date, the shape both sides of a correlation join
/// must be reduced to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayValue {
    pub date: NaiveDate,
    pub value: f64,
}

// ============================================================================
// Derived statistics
// ============================================================================

/// Per-day summary over all readings falling on that calendar date.
///
/// Days with zero readings are never emitted. `avg` is rounded half-up to
/// the nearest whole unit for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub avg: i64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Time-in-range breakdown of a flat set of readings.
///
/// `very_low` / `very_high` are nested sub-thresholds that overlap the
/// `low` / `high` buckets, so only `in_range + low + high` sums to 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeBreakdown {
    pub total_readings: usize,
    pub in_range_percent: f64,
    pub low_percent: f64,
    pub high_percent: f64,
    pub very_low_percent: f64,
    pub very_high_percent: f64,
}

/// Percentile band for one hour-of-day in an AGP profile.
///
/// Hours with no observations carry `count: 0` and null percentiles rather
/// than being omitted: an AGP is always exactly 24 entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyStat {
    pub hour: u32,
    pub p10: Option<i64>,
    pub p25: Option<i64>,
    pub median: Option<i64>,
    pub p75: Option<i64>,
    pub p90: Option<i64>,
    pub count: usize,
}

/// Full Ambulatory Glucose Profile response.
#[derive(Debug, Clone, Serialize)]
pub struct AgpProfile {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_readings: usize,
    pub hourly: Vec<HourlyStat>,
}

/// Least-squares trend line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

/// One date-joined point in a correlation scatter plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationPoint {
    pub date: NaiveDate,
    pub x: f64,
    pub y: f64,
}

/// Result of correlating two daily metric series.
///
/// `r`, `p_value` and `trend` are all absent when the joined sample is
/// degenerate (fewer than 2 overlapping dates, or zero variance) — never
/// NaN, never an error.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationResult {
    pub x_metric: String,
    pub y_metric: String,
    pub r: Option<f64>,
    pub p_value: Option<f64>,
    pub trend: Option<TrendLine>,
    pub points: Vec<CorrelationPoint>,
    pub available_metrics: Vec<&'static str>,
}

// ============================================================================
// Daily metric records
// ============================================================================

/// Daily heart rate summary: resting HR plus zone minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateDaily {
    pub date: NaiveDate,
    pub resting_heart_rate: Option<i64>,
    pub fat_burn_minutes: Option<i64>,
    pub cardio_minutes: Option<i64>,
    pub peak_minutes: Option<i64>,
}

/// One sleep session with score components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepLog {
    pub date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration_ms: Option<i64>,
    pub efficiency: Option<i64>,
    pub minutes_asleep: Option<i64>,
    pub minutes_awake: Option<i64>,
    pub overall_score: Option<i64>,
    pub deep_sleep_minutes: Option<i64>,
    pub rem_sleep_minutes: Option<i64>,
    pub light_sleep_minutes: Option<i64>,
}

/// Daily activity summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDaily {
    pub date: NaiveDate,
    pub steps: Option<i64>,
    pub distance_km: Option<f64>,
    pub calories_total: Option<i64>,
    pub calories_active: Option<i64>,
    pub minutes_sedentary: Option<i64>,
    pub minutes_lightly_active: Option<i64>,
    pub minutes_fairly_active: Option<i64>,
    pub minutes_very_active: Option<i64>,
    pub active_zone_minutes: Option<i64>,
}

/// Nightly SpO2 summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpO2Daily {
    pub date: NaiveDate,
    pub avg_spo2: Option<f64>,
    pub min_spo2: Option<f64>,
    pub max_spo2: Option<f64>,
}

/// Nightly heart rate variability summary (RMSSD in ms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrvDaily {
    pub date: NaiveDate,
    pub daily_rmssd: Option<f64>,
    pub deep_rmssd: Option<f64>,
}

/// Nightly breathing rate in breaths/min.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreathingRateDaily {
    pub date: NaiveDate,
    pub breathing_rate: f64,
}

/// Nightly skin temperature deviation from personal baseline, in °C.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinTemperatureDaily {
    pub date: NaiveDate,
    pub relative_temp: f64,
}

/// Estimated VO2 max (cardio fitness score).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vo2MaxDaily {
    pub date: NaiveDate,
    pub vo2_max: f64,
}

/// Daily stress management score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScoreDaily {
    pub date: NaiveDate,
    pub stress_score: i64,
    pub exertion_score: Option<i64>,
    pub responsiveness_score: Option<i64>,
}

// ============================================================================
// Daily metric taxonomy
// ============================================================================

/// The set of natively-daily metrics the store understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyMetric {
    HeartRate,
    Sleep,
    Activity,
    SpO2,
    Hrv,
    BreathingRate,
    SkinTemperature,
    Vo2Max,
    Stress,
}

impl DailyMetric {
    pub const ALL: [DailyMetric; 9] = [
        DailyMetric::HeartRate,
        DailyMetric::Sleep,
        DailyMetric::Activity,
        DailyMetric::SpO2,
        DailyMetric::Hrv,
        DailyMetric::BreathingRate,
        DailyMetric::SkinTemperature,
        DailyMetric::Vo2Max,
        DailyMetric::Stress,
    ];

    /// Stable identifier used as storage key and API metric name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DailyMetric::HeartRate => "heart_rate_daily",
            DailyMetric::Sleep => "sleep",
            DailyMetric::Activity => "activity",
            DailyMetric::SpO2 => "spo2",
            DailyMetric::Hrv => "hrv",
            DailyMetric::BreathingRate => "breathing_rate",
            DailyMetric::SkinTemperature => "skin_temperature",
            DailyMetric::Vo2Max => "vo2_max",
            DailyMetric::Stress => "stress",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DailyMetric::HeartRate => "Heart Rate (Daily)",
            DailyMetric::Sleep => "Sleep",
            DailyMetric::Activity => "Activity (Daily)",
            DailyMetric::SpO2 => "SpO2",
            DailyMetric::Hrv => "Heart Rate Variability",
            DailyMetric::BreathingRate => "Breathing Rate",
            DailyMetric::SkinTemperature => "Skin Temperature",
            DailyMetric::Vo2Max => "VO2 Max",
            DailyMetric::Stress => "Stress Score",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            DailyMetric::HeartRate => "bpm",
            DailyMetric::Sleep => "",
            DailyMetric::Activity => "",
            DailyMetric::SpO2 => "%",
            DailyMetric::Hrv => "ms",
            DailyMetric::BreathingRate => "breaths/min",
            DailyMetric::SkinTemperature => "°C",
            DailyMetric::Vo2Max => "mL/kg/min",
            DailyMetric::Stress => "",
        }
    }
}

/// A typed daily record for any of the supported metrics.
///
/// The `metric` tag makes ingestion payloads self-describing:
/// `{"metric": "spo2", "date": "2024-01-15", "avg_spo2": 96.1, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum DailyRecord {
    HeartRate(HeartRateDaily),
    Sleep(SleepLog),
    Activity(ActivityDaily),
    #[serde(rename = "spo2")]
    SpO2(SpO2Daily),
    Hrv(HrvDaily),
    BreathingRate(BreathingRateDaily),
    SkinTemperature(SkinTemperatureDaily),
    Vo2Max(Vo2MaxDaily),
    Stress(StressScoreDaily),
}

impl DailyRecord {
    pub fn kind(&self) -> DailyMetric {
        match self {
            DailyRecord::HeartRate(_) => DailyMetric::HeartRate,
            DailyRecord::Sleep(_) => DailyMetric::Sleep,
            DailyRecord::Activity(_) => DailyMetric::Activity,
            DailyRecord::SpO2(_) => DailyMetric::SpO2,
            DailyRecord::Hrv(_) => DailyMetric::Hrv,
            DailyRecord::BreathingRate(_) => DailyMetric::BreathingRate,
            DailyRecord::SkinTemperature(_) => DailyMetric::SkinTemperature,
            DailyRecord::Vo2Max(_) => DailyMetric::Vo2Max,
            DailyRecord::Stress(_) => DailyMetric::Stress,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            DailyRecord::HeartRate(r) => r.date,
            DailyRecord::Sleep(r) => r.date,
            DailyRecord::Activity(r) => r.date,
            DailyRecord::SpO2(r) => r.date,
            DailyRecord::Hrv(r) => r.date,
            DailyRecord::BreathingRate(r) => r.date,
            DailyRecord::SkinTemperature(r) => r.date,
            DailyRecord::Vo2Max(r) => r.date,
            DailyRecord::Stress(r) => r.date,
        }
    }
}

// ============================================================================
// Overview snapshot
// ============================================================================

/// Single-day snapshot across every daily metric.
///
/// Each field is independently present-or-null: one metric having no data
/// for the day must never suppress the others.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OverviewSnapshot {
    pub date: NaiveDate,
    pub heart_rate: Option<HeartRateDaily>,
    pub sleep: Option<SleepLog>,
    pub activity: Option<ActivityDaily>,
    pub spo2: Option<SpO2Daily>,
    pub hrv: Option<HrvDaily>,
    pub breathing_rate: Option<BreathingRateDaily>,
    pub skin_temperature: Option<SkinTemperatureDaily>,
    pub vo2_max: Option<Vo2MaxDaily>,
    pub stress: Option<StressScoreDaily>,
}

// ============================================================================
// Metric catalog
// ============================================================================

/// Catalog entry describing one stored metric and its data extent.
#[derive(Debug, Clone, Serialize)]
pub struct MetricInfo {
    pub name: String,
    pub label: String,
    pub unit: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub count: usize,
}
