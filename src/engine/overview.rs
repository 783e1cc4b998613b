//! Overview Composer — one-day snapshot across every daily metric.

use chrono::NaiveDate;

use crate::store::{HealthDataStore, StoreError};
use crate::types::{DailyMetric, DailyRecord, OverviewSnapshot};

/// Assemble the snapshot for a single date. Each metric is looked up
/// independently; a metric with no record for the date stays null without
/// affecting the rest. Store failures still propagate.
pub fn compose(store: &dyn HealthDataStore, date: NaiveDate) -> Result<OverviewSnapshot, StoreError> {
    let mut snapshot = OverviewSnapshot { date, ..Default::default() };

    for kind in DailyMetric::ALL {
        let record = store.daily_records(kind, date, date)?.into_iter().next();
        let Some(record) = record else { continue };

        match record {
            DailyRecord::HeartRate(r) => snapshot.heart_rate = Some(r),
            DailyRecord::Sleep(r) => snapshot.sleep = Some(r),
            DailyRecord::Activity(r) => snapshot.activity = Some(r),
            DailyRecord::SpO2(r) => snapshot.spo2 = Some(r),
            DailyRecord::Hrv(r) => snapshot.hrv = Some(r),
            DailyRecord::BreathingRate(r) => snapshot.breathing_rate = Some(r),
            DailyRecord::SkinTemperature(r) => snapshot.skin_temperature = Some(r),
            DailyRecord::Vo2Max(r) => snapshot.vo2_max = Some(r),
            DailyRecord::Stress(r) => snapshot.stress = Some(r),
        }
    }

    Ok(snapshot)
}
