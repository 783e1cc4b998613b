//! Sled-backed health data store.
//!
//! Layout:
//! - One tree per intraday stream, named `readings:<metric>`. Key is the
//!   timestamp as seconds-since-epoch in big-endian bytes (sorts
//!   chronologically), value is the reading value as JSON.
//! - One tree per daily metric, named `daily:<metric>`. Key is the ISO
//!   `YYYY-MM-DD` date string (also sorts chronologically), value is the
//!   JSON [`DailyRecord`].
//!
//! Writes rely on sled's background flushing; on crash at most the last few
//! ingested rows are lost and can be re-ingested from the export.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use super::{intraday_label_unit, HealthDataStore, StoreError};
use crate::types::{DailyMetric, DailyRecord, MetricInfo, Reading};

const READINGS_PREFIX: &str = "readings:";
const DAILY_PREFIX: &str = "daily:";

/// Sled-backed implementation of [`HealthDataStore`].
#[derive(Clone)]
pub struct SledStore {
    db: Arc<sled::Db>,
}

impl SledStore {
    /// Open or create the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn readings_tree(&self, metric: &str) -> Result<sled::Tree, StoreError> {
        Ok(self.db.open_tree(format!("{READINGS_PREFIX}{metric}"))?)
    }

    fn daily_tree(&self, kind: DailyMetric) -> Result<sled::Tree, StoreError> {
        Ok(self.db.open_tree(format!("{DAILY_PREFIX}{}", kind.as_str()))?)
    }

    fn ts_key(ts: NaiveDateTime) -> [u8; 8] {
        // Health exports are strictly post-epoch, so the cast is order-preserving.
        (ts.and_utc().timestamp() as u64).to_be_bytes()
    }

    fn ts_from_key(key: &[u8]) -> Option<NaiveDateTime> {
        let bytes: [u8; 8] = key.try_into().ok()?;
        DateTime::from_timestamp(u64::from_be_bytes(bytes) as i64, 0).map(|dt| dt.naive_utc())
    }

    /// Extent of one tree: (first key, last key, len), None when empty.
    fn tree_extent(tree: &sled::Tree) -> Result<Option<(sled::IVec, sled::IVec, usize)>, StoreError> {
        let first = tree.first()?;
        let last = tree.last()?;
        match (first, last) {
            (Some((f, _)), Some((l, _))) => Ok(Some((f, l, tree.len()))),
            _ => Ok(None),
        }
    }
}

impl HealthDataStore for SledStore {
    fn readings(
        &self,
        metric: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Reading>, StoreError> {
        let tree = self.readings_tree(metric)?;
        let mut out = Vec::new();

        for item in tree.range(Self::ts_key(start)..Self::ts_key(end)) {
            let (key, value) = item?;
            let Some(timestamp) = Self::ts_from_key(&key) else {
                continue;
            };
            let value: f64 = serde_json::from_slice(&value)?;
            out.push(Reading { timestamp, value });
        }

        Ok(out)
    }

    fn insert_readings(&self, metric: &str, readings: &[Reading]) -> Result<usize, StoreError> {
        let tree = self.readings_tree(metric)?;
        let mut inserted = 0;

        for reading in readings {
            let key = Self::ts_key(reading.timestamp);
            let value = serde_json::to_vec(&reading.value)?;
            if tree.insert(key, value)?.is_none() {
                inserted += 1;
            }
        }

        debug!(metric, total = readings.len(), inserted, "Ingested readings");
        Ok(inserted)
    }

    fn daily_records(
        &self,
        kind: DailyMetric,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyRecord>, StoreError> {
        let tree = self.daily_tree(kind)?;
        let start_key = start.to_string().into_bytes();
        let end_key = end.to_string().into_bytes();
        let mut out = Vec::new();

        for item in tree.range(start_key..=end_key) {
            let (_key, value) = item?;
            out.push(serde_json::from_slice(&value)?);
        }

        Ok(out)
    }

    fn insert_daily(&self, record: &DailyRecord) -> Result<(), StoreError> {
        let tree = self.daily_tree(record.kind())?;
        let key = record.date().to_string().into_bytes();
        let value = serde_json::to_vec(record)?;
        tree.insert(key, value)?;
        Ok(())
    }

    fn metric_catalog(&self) -> Result<Vec<MetricInfo>, StoreError> {
        let mut catalog = Vec::new();

        for name in self.db.tree_names() {
            let Ok(name) = std::str::from_utf8(&name) else {
                continue;
            };

            if let Some(metric) = name.strip_prefix(READINGS_PREFIX) {
                let tree = self.db.open_tree(name)?;
                if let Some((first, last, count)) = Self::tree_extent(&tree)? {
                    let (Some(start), Some(end)) =
                        (Self::ts_from_key(&first), Self::ts_from_key(&last))
                    else {
                        continue;
                    };
                    let (label, unit) = intraday_label_unit(metric);
                    catalog.push(MetricInfo {
                        name: metric.to_string(),
                        label,
                        unit,
                        start_date: start.date(),
                        end_date: end.date(),
                        count,
                    });
                }
            } else if let Some(metric) = name.strip_prefix(DAILY_PREFIX) {
                let tree = self.db.open_tree(name)?;
                if let Some((first, last, count)) = Self::tree_extent(&tree)? {
                    let parse = |key: &[u8]| {
                        std::str::from_utf8(key)
                            .ok()
                            .and_then(|s| s.parse::<NaiveDate>().ok())
                    };
                    let (Some(start), Some(end)) = (parse(&first), parse(&last)) else {
                        continue;
                    };
                    let kind = DailyMetric::ALL.iter().find(|k| k.as_str() == metric);
                    let (label, unit) = match kind {
                        Some(k) => (k.label().to_string(), k.unit().to_string()),
                        None => (metric.to_string(), String::new()),
                    };
                    catalog.push(MetricInfo {
                        name: metric.to_string(),
                        label,
                        unit,
                        start_date: start,
                        end_date: end,
                        count,
                    });
                }
            }
        }

        catalog.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn open_temp() -> (SledStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStore::open(dir.path().join("db")).unwrap();
        (store, dir)
    }

    #[test]
    fn test_readings_half_open_range() {
        let (store, _dir) = open_temp();
        let readings = [
            Reading { timestamp: ts("2024-01-14 23:59:00"), value: 80.0 },
            Reading { timestamp: ts("2024-01-15 08:00:00"), value: 100.0 },
            Reading { timestamp: ts("2024-01-16 00:00:00"), value: 120.0 },
        ];
        store.insert_readings("glucose", &readings).unwrap();

        let day = store
            .readings("glucose", ts("2024-01-15 00:00:00"), ts("2024-01-16 00:00:00"))
            .unwrap();

        assert_eq!(day.len(), 1, "end bound is exclusive, start inclusive");
        assert_eq!(day[0].value, 100.0);
    }

    #[test]
    fn test_duplicate_timestamp_overwrites() {
        let (store, _dir) = open_temp();
        let first = [Reading { timestamp: ts("2024-01-15 08:00:00"), value: 100.0 }];
        let second = [Reading { timestamp: ts("2024-01-15 08:00:00"), value: 105.0 }];

        assert_eq!(store.insert_readings("glucose", &first).unwrap(), 1);
        assert_eq!(
            store.insert_readings("glucose", &second).unwrap(),
            0,
            "re-ingesting the same timestamp is not a new reading"
        );

        let day = store
            .readings("glucose", ts("2024-01-15 00:00:00"), ts("2024-01-16 00:00:00"))
            .unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day[0].value, 105.0, "latest value wins");
    }

    #[test]
    fn test_daily_records_inclusive_and_ordered() {
        let (store, _dir) = open_temp();
        for (d, rmssd) in [("2024-01-17", 42.0), ("2024-01-15", 38.0), ("2024-01-16", 40.0)] {
            store
                .insert_daily(&DailyRecord::Hrv(crate::types::HrvDaily {
                    date: date(d),
                    daily_rmssd: Some(rmssd),
                    deep_rmssd: None,
                }))
                .unwrap();
        }

        let rows = store
            .daily_records(DailyMetric::Hrv, date("2024-01-15"), date("2024-01-16"))
            .unwrap();

        assert_eq!(rows.len(), 2, "date range is inclusive of both ends");
        assert_eq!(rows[0].date(), date("2024-01-15"), "ascending by date");
        assert_eq!(rows[1].date(), date("2024-01-16"));
    }

    #[test]
    fn test_catalog_reports_extent() {
        let (store, _dir) = open_temp();
        store
            .insert_readings(
                "glucose",
                &[
                    Reading { timestamp: ts("2024-01-10 08:00:00"), value: 90.0 },
                    Reading { timestamp: ts("2024-01-20 08:00:00"), value: 110.0 },
                ],
            )
            .unwrap();

        let catalog = store.metric_catalog().unwrap();
        let glucose = catalog.iter().find(|m| m.name == "glucose").unwrap();
        assert_eq!(glucose.label, "Glucose");
        assert_eq!(glucose.unit, "mg/dL");
        assert_eq!(glucose.start_date, date("2024-01-10"));
        assert_eq!(glucose.end_date, date("2024-01-20"));
        assert_eq!(glucose.count, 2);
    }

    #[test]
    fn test_empty_store_has_empty_catalog() {
        let (store, _dir) = open_temp();
        assert!(store.metric_catalog().unwrap().is_empty());
    }
}
