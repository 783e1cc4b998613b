//! API route table.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

/// Build the API router, mounted under `/api`.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metric_catalog))
        // Dashboard data
        .route("/data/overview", get(handlers::data_overview))
        .route("/data/glucose", get(handlers::glucose_readings))
        .route("/data/glucose/daily", get(handlers::glucose_daily))
        .route("/data/glucose/time-in-range", get(handlers::time_in_range))
        .route("/data/glucose/agp", get(handlers::glucose_agp))
        .route("/data/heart-rate/daily", get(handlers::heart_rate_daily))
        .route("/data/correlations", get(handlers::correlations))
        // Ingestion
        .route("/ingest/readings", post(handlers::ingest_readings))
        .route("/ingest/daily", post(handlers::ingest_daily))
        .with_state(state)
}
