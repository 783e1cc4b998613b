//! API route handlers.
//!
//! Handlers are thin: parse/resolve the query, fetch from the store, hand
//! the materialized slices to [`crate::engine`], wrap the result in the
//! response envelope. All statistics are computed per request.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::config::VitalboardConfig;
use crate::engine::correlation::CorrelationMetric;
use crate::engine::{self, agp, correlation, daily, overview, range, EngineError};
use crate::store::HealthDataStore;
use crate::types::{CorrelationResult, DailyRecord, DailySummary, DayValue, HeartRateDaily, HourlyStat, MetricInfo, Reading, TrendLine};

/// Storage key and API name of the intraday glucose stream.
pub const GLUCOSE_METRIC: &str = "glucose";

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn HealthDataStore>,
    pub config: Arc<VitalboardConfig>,
    pub started_at: Instant,
}

impl ApiState {
    pub fn new(store: Arc<dyn HealthDataStore>, config: Arc<VitalboardConfig>) -> Self {
        Self {
            store,
            config,
            started_at: Instant::now(),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Map an engine error onto the envelope: malformed queries are 4xx,
/// storage failures 5xx.
fn error_response(err: EngineError) -> Response {
    match &err {
        EngineError::MalformedDate(_)
        | EngineError::InvalidRange { .. }
        | EngineError::UnknownMetric(_) => ApiErrorResponse::bad_request(err.to_string()),
        EngineError::Store(e) => {
            error!(error = %e, "store failure while serving request");
            ApiErrorResponse::internal(e.to_string())
        }
    }
}

// ============================================================================
// Query types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReadingsQuery {
    /// Single-day shorthand; takes precedence over `start`/`end`.
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TimeInRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    /// Per-request override of the configured target band.
    pub low_threshold: Option<f64>,
    pub high_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CorrelationQuery {
    pub x: String,
    pub y: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: &'static str,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct MetricCatalogData {
    pub metrics: Vec<MetricInfo>,
}

#[derive(Debug, Serialize)]
pub struct GlucoseReadingsData {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub count: usize,
    pub readings: Vec<Reading>,
}

#[derive(Debug, Serialize)]
pub struct GlucoseDailyData {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DailySummary>,
}

#[derive(Debug, Serialize)]
pub struct TimeInRangeData {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub low_threshold: f64,
    pub high_threshold: f64,
    #[serde(flatten)]
    pub breakdown: crate::types::RangeBreakdown,
}

#[derive(Debug, Serialize)]
pub struct AgpData {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_readings: usize,
    pub hourly: Vec<HourlyStat>,
}

#[derive(Debug, Serialize)]
pub struct CorrelationData {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub result: CorrelationResult,
}

#[derive(Debug, Serialize)]
pub struct HeartRateDailyData {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub records: Vec<HeartRateDaily>,
    /// Least-squares fit of resting HR against day index, for the trend
    /// overlay on the daily chart.
    pub resting_trend: Option<TrendLine>,
}

#[derive(Debug, Deserialize)]
pub struct IngestReadingsRequest {
    pub metric: String,
    pub readings: Vec<Reading>,
}

#[derive(Debug, Serialize)]
pub struct IngestReadingsData {
    pub metric: String,
    pub received: usize,
    pub inserted: usize,
}

#[derive(Debug, Deserialize)]
pub struct IngestDailyRequest {
    pub records: Vec<DailyRecord>,
}

#[derive(Debug, Serialize)]
pub struct IngestDailyData {
    pub inserted: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/health
pub async fn health(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(HealthData {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

/// GET /api/metrics — catalog of stored metrics and their data extent.
pub async fn metric_catalog(State(state): State<ApiState>) -> Response {
    match state.store.metric_catalog() {
        Ok(metrics) => ApiResponse::ok(MetricCatalogData { metrics }),
        Err(e) => error_response(e.into()),
    }
}

/// GET /api/data/glucose — raw readings for one day (`date=`) or a window.
pub async fn glucose_readings(
    State(state): State<ApiState>,
    Query(query): Query<ReadingsQuery>,
) -> Response {
    let range_query = match query.date {
        Some(ref s) => match engine::parse_date(s) {
            Ok(_) => RangeQuery { start: Some(s.clone()), end: Some(s.clone()) },
            Err(e) => return error_response(e),
        },
        None => RangeQuery { start: query.start, end: query.end },
    };

    match fetch_glucose(&state, &range_query, state.config.windows.default_range_days) {
        Ok((start, end, readings)) => ApiResponse::ok(GlucoseReadingsData {
            start_date: start,
            end_date: end,
            count: readings.len(),
            readings,
        }),
        Err(e) => error_response(e),
    }
}

/// GET /api/data/glucose/daily — per-day avg/min/max/count summaries.
pub async fn glucose_daily(
    State(state): State<ApiState>,
    Query(query): Query<RangeQuery>,
) -> Response {
    match fetch_glucose(&state, &query, state.config.windows.default_range_days) {
        Ok((start, end, readings)) => ApiResponse::ok(GlucoseDailyData {
            start_date: start,
            end_date: end,
            days: daily::daily_summaries(&readings),
        }),
        Err(e) => error_response(e),
    }
}

/// GET /api/data/glucose/time-in-range
pub async fn time_in_range(
    State(state): State<ApiState>,
    Query(query): Query<TimeInRangeQuery>,
) -> Response {
    let low = query.low_threshold.unwrap_or(state.config.glucose.low_threshold);
    let high = query.high_threshold.unwrap_or(state.config.glucose.high_threshold);
    if low >= high {
        return ApiErrorResponse::bad_request(format!(
            "low_threshold {low} must be below high_threshold {high}"
        ));
    }

    let range_query = RangeQuery { start: query.start, end: query.end };
    match fetch_glucose(&state, &range_query, state.config.windows.default_range_days) {
        Ok((start, end, readings)) => {
            let values: Vec<f64> = readings.iter().map(|r| r.value).collect();
            ApiResponse::ok(TimeInRangeData {
                start_date: start,
                end_date: end,
                low_threshold: low,
                high_threshold: high,
                breakdown: range::classify(&values, low, high),
            })
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/data/glucose/agp — hourly percentile bands over the window.
pub async fn glucose_agp(
    State(state): State<ApiState>,
    Query(query): Query<RangeQuery>,
) -> Response {
    match fetch_glucose(&state, &query, state.config.windows.agp_days) {
        Ok((start, end, readings)) => ApiResponse::ok(AgpData {
            start_date: start,
            end_date: end,
            total_readings: readings.len(),
            hourly: agp::hourly_profile(&readings),
        }),
        Err(e) => error_response(e),
    }
}

/// GET /api/data/correlations?x=...&y=...
pub async fn correlations(
    State(state): State<ApiState>,
    Query(query): Query<CorrelationQuery>,
) -> Response {
    let result = (|| -> Result<CorrelationData, EngineError> {
        let x_metric = CorrelationMetric::from_id(&query.x)
            .ok_or_else(|| EngineError::UnknownMetric(query.x.clone()))?;
        let y_metric = CorrelationMetric::from_id(&query.y)
            .ok_or_else(|| EngineError::UnknownMetric(query.y.clone()))?;

        let (start, end) = engine::resolve_range(
            query.start.as_deref(),
            query.end.as_deref(),
            state.config.windows.correlation_days,
            today(),
        )?;

        let xs = metric_series(state.store.as_ref(), x_metric, start, end)?;
        let ys = metric_series(state.store.as_ref(), y_metric, start, end)?;

        Ok(CorrelationData {
            start_date: start,
            end_date: end,
            result: correlation::correlate(x_metric, y_metric, &xs, &ys),
        })
    })();

    match result {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => error_response(e),
    }
}

/// GET /api/data/heart-rate/daily — records plus a resting-HR trend line.
pub async fn heart_rate_daily(
    State(state): State<ApiState>,
    Query(query): Query<RangeQuery>,
) -> Response {
    let result = (|| -> Result<HeartRateDailyData, EngineError> {
        let (start, end) = engine::resolve_range(
            query.start.as_deref(),
            query.end.as_deref(),
            state.config.windows.default_range_days,
            today(),
        )?;

        let records: Vec<HeartRateDaily> = state
            .store
            .daily_records(crate::types::DailyMetric::HeartRate, start, end)?
            .into_iter()
            .filter_map(|r| match r {
                DailyRecord::HeartRate(hr) => Some(hr),
                _ => None,
            })
            .collect();

        let resting: Vec<DayValue> = records
            .iter()
            .filter_map(|r| {
                r.resting_heart_rate
                    .map(|v| DayValue { date: r.date, value: v as f64 })
            })
            .collect();

        Ok(HeartRateDailyData {
            start_date: start,
            end_date: end,
            resting_trend: correlation::day_index_trend(&resting),
            records,
        })
    })();

    match result {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => error_response(e),
    }
}

/// GET /api/data/overview — one-day snapshot across daily metrics.
pub async fn data_overview(
    State(state): State<ApiState>,
    Query(query): Query<DateQuery>,
) -> Response {
    let date = match query.date.as_deref() {
        Some(s) => match engine::parse_date(s) {
            Ok(d) => d,
            Err(e) => return error_response(e),
        },
        None => today(),
    };

    match overview::compose(state.store.as_ref(), date) {
        Ok(snapshot) => ApiResponse::ok(snapshot),
        Err(e) => error_response(e.into()),
    }
}

/// POST /api/ingest/readings
pub async fn ingest_readings(
    State(state): State<ApiState>,
    Json(request): Json<IngestReadingsRequest>,
) -> Response {
    if request.metric.trim().is_empty() {
        return ApiErrorResponse::bad_request("metric name must not be empty");
    }

    match state.store.insert_readings(&request.metric, &request.readings) {
        Ok(inserted) => {
            info!(
                metric = %request.metric,
                received = request.readings.len(),
                inserted,
                "ingested readings"
            );
            ApiResponse::ok(IngestReadingsData {
                metric: request.metric,
                received: request.readings.len(),
                inserted,
            })
        }
        Err(e) => error_response(e.into()),
    }
}

/// POST /api/ingest/daily
pub async fn ingest_daily(
    State(state): State<ApiState>,
    Json(request): Json<IngestDailyRequest>,
) -> Response {
    let count = request.records.len();
    for record in &request.records {
        if let Err(e) = state.store.insert_daily(record) {
            return error_response(e.into());
        }
    }

    info!(inserted = count, "ingested daily records");
    ApiResponse::ok(IngestDailyData { inserted: count })
}

// ============================================================================
// Fetch helpers
// ============================================================================

/// Resolve the query window and pull glucose readings for it.
fn fetch_glucose(
    state: &ApiState,
    query: &RangeQuery,
    default_days: i64,
) -> Result<(NaiveDate, NaiveDate, Vec<Reading>), EngineError> {
    let (start, end) = engine::resolve_range(
        query.start.as_deref(),
        query.end.as_deref(),
        default_days,
        today(),
    )?;

    let (from, to) = engine::day_bounds(start, end);
    let readings = state.store.readings(GLUCOSE_METRIC, from, to)?;
    Ok((start, end, readings))
}

/// Materialize a correlation metric as one scalar per day. `avg_glucose`
/// is the Daily Aggregator applied to the raw stream; everything else is a
/// field projected out of typed daily records.
fn metric_series(
    store: &dyn HealthDataStore,
    metric: CorrelationMetric,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DayValue>, EngineError> {
    match metric.source() {
        None => {
            let (from, to) = engine::day_bounds(start, end);
            let readings = store.readings(GLUCOSE_METRIC, from, to)?;
            Ok(daily::daily_means(&readings))
        }
        Some(kind) => {
            let records = store.daily_records(kind, start, end)?;
            Ok(records
                .iter()
                .filter_map(|r| {
                    metric
                        .scalar_from(r)
                        .map(|value| DayValue { date: r.date(), value })
                })
                .collect())
        }
    }
}
