//! Reading Store — the persistence collaborator behind the engine.
//!
//! The engine itself is pure and only ever sees in-memory slices; this
//! module supplies them. Two implementations exist:
//!
//! - [`SledStore`]: sled-backed, keys sorted for chronological range scans
//! - [`MemoryStore`]: BTreeMap-backed, for tests and `--ephemeral` mode
//!
//! Query contract:
//! - `readings` covers the half-open instant interval `[start, end)`,
//!   ascending by timestamp.
//! - `daily_records` covers the inclusive date interval `[start, end]`,
//!   ascending by date.
//! - Ingesting a reading with an exact timestamp that already exists
//!   overwrites it (duplicate-timestamp dedup happens at ingest, matching
//!   the unique timestamp indexes of the upstream exports).

pub mod memory;
pub mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::types::{DailyMetric, DailyRecord, MetricInfo, Reading};

/// Error type for store operations. Storage failures are propagated to the
/// caller as-is; the engine never retries or masks them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Query capability the engine's HTTP layer is written against.
pub trait HealthDataStore: Send + Sync {
    /// Intraday readings for `metric` in `[start, end)`, timestamp ascending.
    fn readings(
        &self,
        metric: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Reading>, StoreError>;

    /// Store normalized readings for `metric`. Returns the number of
    /// readings that were new (exact-timestamp duplicates overwrite).
    fn insert_readings(&self, metric: &str, readings: &[Reading]) -> Result<usize, StoreError>;

    /// Daily records of `kind` with dates in `[start, end]`, date ascending.
    fn daily_records(
        &self,
        kind: DailyMetric,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, StoreError>;

    /// Upsert one daily record, keyed by (metric, date).
    fn insert_daily(&self, record: &DailyRecord) -> Result<(), StoreError>;

    /// Every metric with at least one stored observation, with its extent.
    fn metric_catalog(&self) -> Result<Vec<MetricInfo>, StoreError>;
}

/// Display metadata for intraday reading streams. Daily metrics get theirs
/// from [`DailyMetric::label`]; unknown streams fall back to the raw name.
pub(crate) fn intraday_label_unit(metric: &str) -> (String, String) {
    match metric {
        "glucose" => ("Glucose".to_string(), "mg/dL".to_string()),
        "heart_rate_intraday" => ("Heart Rate (Intraday)".to_string(), "bpm".to_string()),
        "spo2_intraday" => ("SpO2 (Intraday)".to_string(), "%".to_string()),
        other => (other.to_string(), String::new()),
    }
}
