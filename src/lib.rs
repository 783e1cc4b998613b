//! vitalboard: personal health metrics dashboard service.
//!
//! Aggregates wearable and CGM data into dashboard-ready statistics:
//!
//! - **Daily Aggregator**: per-day avg/min/max/count over intraday readings
//! - **Time-in-Range**: classification against a configurable glucose band
//! - **AGP**: hourly percentile profile (Ambulatory Glucose Profile)
//! - **Correlation Engine**: date-joined Pearson correlation across metrics
//! - **Overview Composer**: one-day snapshot across every daily metric
//!
//! The statistics live in [`engine`] as pure functions over in-memory
//! slices; [`store`] supplies those slices from sled (or memory, in tests);
//! [`api`] exposes them over HTTP with a uniform response envelope.

pub mod api;
pub mod config;
pub mod demo;
pub mod engine;
pub mod store;
pub mod types;

pub use config::VitalboardConfig;
pub use store::{HealthDataStore, StoreError};
pub use types::{DailyMetric, DailyRecord, Reading};
