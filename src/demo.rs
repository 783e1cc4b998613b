//! Synthetic demo data for running the dashboard without real exports.
//!
//! Seeded with a fixed RNG so restarts reproduce the same dataset. Glucose
//! follows a smooth circadian curve with meal rises and sensor noise; daily
//! metrics get plausible wearable-like values with small day-to-day drift.

use chrono::{Days, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::info;

use crate::api::handlers::GLUCOSE_METRIC;
use crate::store::{HealthDataStore, StoreError};
use crate::types::{
    ActivityDaily, BreathingRateDaily, DailyRecord, HeartRateDaily, HrvDaily, Reading,
    SkinTemperatureDaily, SleepLog, SpO2Daily, StressScoreDaily, Vo2MaxDaily,
};

const READING_INTERVAL_MINUTES: u32 = 5;

/// Populate the store with `days` days of synthetic data ending today.
pub fn seed(store: &dyn HealthDataStore, end: NaiveDate, days: u64) -> Result<(), StoreError> {
    let mut rng = StdRng::seed_from_u64(0x7157a1);
    let noise = Normal::new(0.0, 9.0).expect("std dev is positive");
    let start = end - Days::new(days.saturating_sub(1));

    let mut total_readings = 0;
    let mut date = start;
    while date <= end {
        let readings = glucose_day(date, &mut rng, &noise);
        total_readings += store.insert_readings(GLUCOSE_METRIC, &readings)?;

        for record in daily_records(date, &mut rng) {
            store.insert_daily(&record)?;
        }

        date = date + Days::new(1);
    }

    info!(
        days,
        readings = total_readings,
        "seeded synthetic demo data"
    );
    Ok(())
}

/// One day of CGM-style readings on a fixed interval.
fn glucose_day(date: NaiveDate, rng: &mut StdRng, noise: &Normal<f64>) -> Vec<Reading> {
    let mut readings = Vec::with_capacity((24 * 60 / READING_INTERVAL_MINUTES) as usize);
    let mut minute = 0;
    while minute < 24 * 60 {
        let timestamp = timestamp_at(date, minute);
        let hour = minute as f64 / 60.0;

        // Circadian baseline plus meal excursions at 8:00, 13:00, 19:00.
        let base = 100.0 + 8.0 * ((hour - 4.0) * std::f64::consts::PI / 12.0).sin();
        let meals = meal_excursion(hour, 8.0, 45.0)
            + meal_excursion(hour, 13.0, 55.0)
            + meal_excursion(hour, 19.0, 60.0);
        let value = (base + meals + noise.sample(rng)).clamp(45.0, 320.0);

        readings.push(Reading { timestamp, value });
        minute += READING_INTERVAL_MINUTES;
    }
    readings
}

/// Gaussian-shaped post-meal rise peaking ~1h after the meal.
fn meal_excursion(hour: f64, meal_hour: f64, peak: f64) -> f64 {
    let dt = hour - (meal_hour + 1.0);
    peak * (-dt * dt / 1.8).exp()
}

fn timestamp_at(date: NaiveDate, minute: u32) -> NaiveDateTime {
    date.and_hms_opt(minute / 60, minute % 60, 0)
        .expect("in-day time is always valid")
}

/// Plausible daily-metric records for one date.
fn daily_records(date: NaiveDate, rng: &mut StdRng) -> Vec<DailyRecord> {
    let sleep_start = date
        .pred_opt()
        .unwrap_or(date)
        .and_hms_opt(23, rng.gen_range(0..45), 0)
        .expect("valid time");
    let minutes_asleep = rng.gen_range(360..480);
    let sleep_end = sleep_start + chrono::Duration::minutes(minutes_asleep + 25);

    vec![
        DailyRecord::HeartRate(HeartRateDaily {
            date,
            resting_heart_rate: Some(rng.gen_range(55..66)),
            fat_burn_minutes: Some(rng.gen_range(60..180)),
            cardio_minutes: Some(rng.gen_range(5..40)),
            peak_minutes: Some(rng.gen_range(0..15)),
        }),
        DailyRecord::Sleep(SleepLog {
            date,
            start_time: sleep_start,
            end_time: sleep_end,
            duration_ms: Some(minutes_asleep * 60_000),
            efficiency: Some(rng.gen_range(88..97)),
            minutes_asleep: Some(minutes_asleep),
            minutes_awake: Some(rng.gen_range(15..45)),
            overall_score: Some(rng.gen_range(68..92)),
            deep_sleep_minutes: Some(rng.gen_range(50..100)),
            rem_sleep_minutes: Some(rng.gen_range(70..120)),
            light_sleep_minutes: Some(rng.gen_range(180..260)),
        }),
        DailyRecord::Activity(ActivityDaily {
            date,
            steps: Some(rng.gen_range(4000..14000)),
            distance_km: Some(rng.gen_range(3.0..11.0)),
            calories_total: Some(rng.gen_range(2000..2900)),
            calories_active: Some(rng.gen_range(400..1100)),
            minutes_sedentary: Some(rng.gen_range(480..720)),
            minutes_lightly_active: Some(rng.gen_range(120..260)),
            minutes_fairly_active: Some(rng.gen_range(10..45)),
            minutes_very_active: Some(rng.gen_range(5..60)),
            active_zone_minutes: Some(rng.gen_range(10..90)),
        }),
        DailyRecord::SpO2(SpO2Daily {
            date,
            avg_spo2: Some(rng.gen_range(94.5..97.5)),
            min_spo2: Some(rng.gen_range(90.0..93.5)),
            max_spo2: Some(rng.gen_range(98.0..100.0)),
        }),
        DailyRecord::Hrv(HrvDaily {
            date,
            daily_rmssd: Some(rng.gen_range(28.0..55.0)),
            deep_rmssd: Some(rng.gen_range(35.0..65.0)),
        }),
        DailyRecord::BreathingRate(BreathingRateDaily {
            date,
            breathing_rate: rng.gen_range(13.0..16.5),
        }),
        DailyRecord::SkinTemperature(SkinTemperatureDaily {
            date,
            relative_temp: rng.gen_range(-1.2..1.2),
        }),
        DailyRecord::Vo2Max(Vo2MaxDaily {
            date,
            vo2_max: rng.gen_range(38.0..44.0),
        }),
        DailyRecord::Stress(StressScoreDaily {
            date,
            stress_score: rng.gen_range(55..90),
            exertion_score: Some(rng.gen_range(50..95)),
            responsiveness_score: Some(rng.gen_range(60..95)),
        }),
    ]
}
