//! In-memory store used by tests and `--ephemeral` mode.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{NaiveDate, NaiveDateTime};

use super::{intraday_label_unit, HealthDataStore, StoreError};
use crate::types::{DailyMetric, DailyRecord, MetricInfo, Reading};

/// BTreeMap-backed implementation of [`HealthDataStore`].
///
/// Semantics mirror [`super::SledStore`] exactly: half-open reading ranges,
/// inclusive daily ranges, exact-timestamp overwrite on ingest.
#[derive(Default)]
pub struct MemoryStore {
    readings: RwLock<BTreeMap<String, BTreeMap<NaiveDateTime, f64>>>,
    daily: RwLock<BTreeMap<DailyMetric, BTreeMap<NaiveDate, DailyRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_err() -> StoreError {
        StoreError::Database("memory store lock poisoned".to_string())
    }
}

impl HealthDataStore for MemoryStore {
    fn readings(
        &self,
        metric: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Reading>, StoreError> {
        let readings = self.readings.read().map_err(|_| Self::lock_err())?;
        let Some(series) = readings.get(metric) else {
            return Ok(Vec::new());
        };
        Ok(series
            .range(start..end)
            .map(|(&timestamp, &value)| Reading { timestamp, value })
            .collect())
    }

    fn insert_readings(&self, metric: &str, new: &[Reading]) -> Result<usize, StoreError> {
        let mut readings = self.readings.write().map_err(|_| Self::lock_err())?;
        let series = readings.entry(metric.to_string()).or_default();
        let mut inserted = 0;
        for reading in new {
            if series.insert(reading.timestamp, reading.value).is_none() {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    fn daily_records(
        &self,
        kind: DailyMetric,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, StoreError> {
        let daily = self.daily.read().map_err(|_| Self::lock_err())?;
        let Some(records) = daily.get(&kind) else {
            return Ok(Vec::new());
        };
        Ok(records.range(start..=end).map(|(_, r)| r.clone()).collect())
    }

    fn insert_daily(&self, record: &DailyRecord) -> Result<(), StoreError> {
        let mut daily = self.daily.write().map_err(|_| Self::lock_err())?;
        daily
            .entry(record.kind())
            .or_default()
            .insert(record.date(), record.clone());
        Ok(())
    }

    fn metric_catalog(&self) -> Result<Vec<MetricInfo>, StoreError> {
        let mut catalog = Vec::new();

        let readings = self.readings.read().map_err(|_| Self::lock_err())?;
        for (name, series) in readings.iter() {
            let (Some((first, _)), Some((last, _))) =
                (series.first_key_value(), series.last_key_value())
            else {
                continue;
            };
            let (label, unit) = intraday_label_unit(name);
            catalog.push(MetricInfo {
                name: name.clone(),
                label,
                unit,
                start_date: first.date(),
                end_date: last.date(),
                count: series.len(),
            });
        }

        let daily = self.daily.read().map_err(|_| Self::lock_err())?;
        for (kind, records) in daily.iter() {
            let (Some((first, _)), Some((last, _))) =
                (records.first_key_value(), records.last_key_value())
            else {
                continue;
            };
            catalog.push(MetricInfo {
                name: kind.as_str().to_string(),
                label: kind.label().to_string(),
                unit: kind.unit().to_string(),
                start_date: *first,
                end_date: *last,
                count: records.len(),
            });
        }

        catalog.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(catalog)
    }
}
