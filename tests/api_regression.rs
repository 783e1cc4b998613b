//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! the /api/* endpoints using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port — runs in CI without `#[ignore]`.

use vitalboard::api::{create_app, ApiState};
use vitalboard::config::VitalboardConfig;
use vitalboard::store::memory::MemoryStore;
use vitalboard::store::HealthDataStore;
use vitalboard::types::{DailyRecord, HeartRateDaily, Reading, SpO2Daily};

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tower::ServiceExt;

fn empty_app() -> Router {
    create_app(ApiState::new(
        Arc::new(MemoryStore::new()),
        Arc::new(VitalboardConfig::default()),
    ))
}

fn app_with(store: MemoryStore) -> Router {
    create_app(ApiState::new(
        Arc::new(store),
        Arc::new(VitalboardConfig::default()),
    ))
}

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn reading(s: &str, value: f64) -> Reading {
    Reading { timestamp: ts(s), value }
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let resp = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

/// Readings spread over three days in January 2024.
fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .insert_readings(
            "glucose",
            &[
                reading("2024-01-10 07:00:00", 62.0),
                reading("2024-01-10 12:30:00", 104.0),
                reading("2024-01-10 19:15:00", 188.0),
                reading("2024-01-11 08:00:00", 95.0),
                reading("2024-01-11 13:00:00", 141.0),
                reading("2024-01-12 09:30:00", 118.0),
            ],
        )
        .unwrap();
    store
}

// ============================================================================
// GET endpoints on an empty store
// ============================================================================

/// All GET endpoints return 200 with no data stored; absence is never an
/// error.
#[tokio::test]
async fn test_get_endpoints_return_200_on_empty_store() {
    let endpoints = [
        "/api/health",
        "/api/metrics",
        "/api/data/overview",
        "/api/data/glucose",
        "/api/data/glucose/daily",
        "/api/data/glucose/time-in-range",
        "/api/data/glucose/agp",
        "/api/data/heart-rate/daily",
        "/api/data/correlations?x=steps&y=sleep_score",
    ];

    for endpoint in endpoints {
        let (status, body) = get_json(empty_app(), endpoint).await;
        assert_eq!(status, StatusCode::OK, "{endpoint} should be 200, body: {body}");
        assert!(body.get("data").is_some(), "{endpoint} missing data envelope");
        assert_eq!(body["meta"]["version"], "1", "{endpoint} missing meta");
    }
}

#[tokio::test]
async fn test_empty_range_yields_empty_data_not_error() {
    let (status, body) = get_json(
        empty_app(),
        "/api/data/glucose/daily?start=2024-01-01&end=2024-01-07",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["days"], serde_json::json!([]));
}

#[tokio::test]
async fn test_empty_time_in_range_is_all_zero() {
    let (status, body) = get_json(
        empty_app(),
        "/api/data/glucose/time-in-range?start=2024-01-01&end=2024-01-07",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_readings"], 0);
    assert_eq!(body["data"]["in_range_percent"], 0.0);
    assert_eq!(body["data"]["very_high_percent"], 0.0);
}

#[tokio::test]
async fn test_empty_agp_still_has_24_hours() {
    let (status, body) = get_json(empty_app(), "/api/data/glucose/agp").await;
    assert_eq!(status, StatusCode::OK);
    let hourly = body["data"]["hourly"].as_array().unwrap();
    assert_eq!(hourly.len(), 24);
    assert_eq!(hourly[0]["hour"], 0);
    assert_eq!(hourly[23]["hour"], 23);
    assert!(hourly[5]["median"].is_null());
    assert_eq!(hourly[5]["count"], 0);
}

// ============================================================================
// Malformed queries
// ============================================================================

#[tokio::test]
async fn test_malformed_date_is_400() {
    let (status, body) = get_json(empty_app(), "/api/data/glucose?start=not-a-date").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_inverted_range_is_400() {
    let (status, _) = get_json(
        empty_app(),
        "/api/data/glucose?start=2024-02-01&end=2024-01-01",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_correlation_metric_is_400() {
    let (status, body) = get_json(
        empty_app(),
        "/api/data/correlations?x=steps&y=shoe_size",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]["message"].as_str().unwrap().contains("shoe_size"),
        "error should name the offending metric"
    );
}

#[tokio::test]
async fn test_inverted_thresholds_are_400() {
    let (status, _) = get_json(
        empty_app(),
        "/api/data/glucose/time-in-range?low_threshold=200&high_threshold=100",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Data-bearing queries
// ============================================================================

#[tokio::test]
async fn test_glucose_daily_summarizes_per_day() {
    let (status, body) = get_json(
        app_with(seeded_store()),
        "/api/data/glucose/daily?start=2024-01-10&end=2024-01-12",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let days = body["data"]["days"].as_array().unwrap();
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["date"], "2024-01-10");
    assert_eq!(days[0]["count"], 3);
    assert_eq!(days[0]["min"], 62.0);
    assert_eq!(days[0]["max"], 188.0);
    // (62 + 104 + 188) / 3 = 118
    assert_eq!(days[0]["avg"], 118);
}

#[tokio::test]
async fn test_time_in_range_with_default_thresholds() {
    let (status, body) = get_json(
        app_with(seeded_store()),
        "/api/data/glucose/time-in-range?start=2024-01-10&end=2024-01-12",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // 62 is low; 188 is high; remaining 4 of 6 are in [70, 180]
    assert_eq!(body["data"]["total_readings"], 6);
    assert_eq!(body["data"]["low_percent"], 16.7);
    assert_eq!(body["data"]["high_percent"], 16.7);
    assert_eq!(body["data"]["in_range_percent"], 66.7);
    assert_eq!(body["data"]["low_threshold"], 70.0);
    assert_eq!(body["data"]["high_threshold"], 180.0);
}

#[tokio::test]
async fn test_time_in_range_threshold_override() {
    let (status, body) = get_json(
        app_with(seeded_store()),
        "/api/data/glucose/time-in-range?start=2024-01-10&end=2024-01-12&low_threshold=60&high_threshold=200",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["in_range_percent"], 100.0);
}

#[tokio::test]
async fn test_glucose_readings_window_is_inclusive_of_end_day() {
    let (status, body) = get_json(
        app_with(seeded_store()),
        "/api/data/glucose?start=2024-01-10&end=2024-01-10",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 3, "all of Jan 10 including evening readings");
}

#[tokio::test]
async fn test_glucose_readings_single_day_shorthand() {
    let (status, body) = get_json(
        app_with(seeded_store()),
        "/api/data/glucose?date=2024-01-11",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);
    assert_eq!(body["data"]["start_date"], "2024-01-11");
    assert_eq!(body["data"]["end_date"], "2024-01-11");
}

#[tokio::test]
async fn test_correlation_reports_r_and_catalog() {
    let store = MemoryStore::new();
    for (day, steps, score) in [(10, 4000, 70), (11, 8000, 80), (12, 12000, 90)] {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        store
            .insert_daily(&DailyRecord::Activity(vitalboard::types::ActivityDaily {
                date,
                steps: Some(steps),
                distance_km: None,
                calories_total: None,
                calories_active: None,
                minutes_sedentary: None,
                minutes_lightly_active: None,
                minutes_fairly_active: None,
                minutes_very_active: None,
                active_zone_minutes: None,
            }))
            .unwrap();
        store
            .insert_daily(&DailyRecord::Sleep(vitalboard::types::SleepLog {
                date,
                start_time: date.and_hms_opt(23, 0, 0).unwrap(),
                end_time: date.and_hms_opt(23, 30, 0).unwrap(),
                duration_ms: None,
                efficiency: None,
                minutes_asleep: None,
                minutes_awake: None,
                overall_score: Some(score),
                deep_sleep_minutes: None,
                rem_sleep_minutes: None,
                light_sleep_minutes: None,
            }))
            .unwrap();
    }

    let (status, body) = get_json(
        app_with(store),
        "/api/data/correlations?x=steps&y=sleep_score&start=2024-01-01&end=2024-01-31",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["x_metric"], "steps");
    assert_eq!(data["points"].as_array().unwrap().len(), 3);
    let r = data["r"].as_f64().unwrap();
    assert!((r - 1.0).abs() < 1e-9, "perfectly linear data, got r={r}");
    assert!(data["trend"]["slope"].as_f64().unwrap() > 0.0);
    assert!(data["available_metrics"]
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m == "avg_glucose"));
}

#[tokio::test]
async fn test_correlation_with_no_overlap_has_null_r() {
    let (status, body) = get_json(
        app_with(seeded_store()),
        "/api/data/correlations?x=steps&y=hrv&start=2024-01-01&end=2024-01-31",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["r"].is_null());
    assert!(body["data"]["p_value"].is_null());
    assert_eq!(body["data"]["points"], serde_json::json!([]));
}

#[tokio::test]
async fn test_overview_is_per_metric_independent() {
    let store = MemoryStore::new();
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    store
        .insert_daily(&DailyRecord::SpO2(SpO2Daily {
            date,
            avg_spo2: Some(96.2),
            min_spo2: None,
            max_spo2: None,
        }))
        .unwrap();

    let (status, body) = get_json(app_with(store), "/api/data/overview?date=2024-01-15").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["date"], "2024-01-15");
    assert_eq!(body["data"]["spo2"]["avg_spo2"], 96.2);
    assert!(body["data"]["sleep"].is_null(), "missing metrics are null, not omitted");
    assert!(body["data"]["heart_rate"].is_null());
}

#[tokio::test]
async fn test_heart_rate_daily_includes_trend() {
    let store = MemoryStore::new();
    for (day, resting) in [(10, 60), (11, 62), (12, 64)] {
        store
            .insert_daily(&DailyRecord::HeartRate(HeartRateDaily {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                resting_heart_rate: Some(resting),
                fat_burn_minutes: None,
                cardio_minutes: None,
                peak_minutes: None,
            }))
            .unwrap();
    }

    let (status, body) = get_json(
        app_with(store),
        "/api/data/heart-rate/daily?start=2024-01-01&end=2024-01-31",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["records"].as_array().unwrap().len(), 3);
    let slope = body["data"]["resting_trend"]["slope"].as_f64().unwrap();
    assert!((slope - 2.0).abs() < 1e-9, "resting HR rises 2 bpm/day, got {slope}");
}

// ============================================================================
// Ingestion round trips
// ============================================================================

#[tokio::test]
async fn test_ingest_readings_then_query() {
    let store = MemoryStore::new();
    let app = app_with(store);

    let (status, body) = post_json(
        app.clone(),
        "/api/ingest/readings",
        serde_json::json!({
            "metric": "glucose",
            "readings": [
                {"timestamp": "2024-01-10T07:00:00", "value": 101.0},
                {"timestamp": "2024-01-10T07:05:00", "value": 104.0}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["data"]["inserted"], 2);

    let (status, body) = get_json(app, "/api/data/glucose?start=2024-01-10&end=2024-01-10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);
}

#[tokio::test]
async fn test_ingest_daily_then_overview() {
    let app = app_with(MemoryStore::new());

    let (status, body) = post_json(
        app.clone(),
        "/api/ingest/daily",
        serde_json::json!({
            "records": [
                {"metric": "hrv", "date": "2024-01-15", "daily_rmssd": 44.5, "deep_rmssd": null}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["data"]["inserted"], 1);

    let (status, body) = get_json(app, "/api/data/overview?date=2024-01-15").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hrv"]["daily_rmssd"], 44.5);
}

#[tokio::test]
async fn test_ingest_empty_metric_name_is_400() {
    let (status, _) = post_json(
        empty_app(),
        "/api/ingest/readings",
        serde_json::json!({"metric": "  ", "readings": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_catalog_reflects_ingested_data() {
    let (status, body) = get_json(app_with(seeded_store()), "/api/metrics").await;
    assert_eq!(status, StatusCode::OK);

    let metrics = body["data"]["metrics"].as_array().unwrap();
    let glucose = metrics
        .iter()
        .find(|m| m["name"] == "glucose")
        .expect("glucose should appear in the catalog");
    assert_eq!(glucose["count"], 6);
    assert_eq!(glucose["start_date"], "2024-01-10");
    assert_eq!(glucose["end_date"], "2024-01-12");
}
