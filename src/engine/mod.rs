//! Aggregation and correlation statistics behind the dashboard endpoints.
//!
//! Pure, stateless statistics over already-materialized in-memory sequences
//! of readings. No I/O happens here: the store hands the handlers slices,
//! the handlers hand them to these functions. Every computation is
//! request-scoped and trivially safe to run concurrently.
//!
//! Submodules:
//! - `daily` — calendar-day summary aggregation (avg/min/max/count)
//! - `range` — time-in-range classification against glucose thresholds
//! - `agp` — hourly percentile banding (Ambulatory Glucose Profile)
//! - `correlation` — date-joined Pearson correlation and trend lines
//! - `overview` — single-day snapshot composition across daily metrics
//!
//! Edge-case policy, uniformly: absent data is a defined empty result, not
//! an error. Only a malformed query (bad date, inverted range, unknown
//! metric) or a storage failure surfaces as [`EngineError`].

pub mod agp;
pub mod correlation;
pub mod daily;
pub mod overview;
pub mod range;

use chrono::{Days, NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::store::StoreError;

/// Engine error taxonomy. `InvalidRange` and friends map to 4xx at the API
/// layer; `Store` maps to 5xx. "No data" is deliberately not represented —
/// every operation returns a structured empty result for that case.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("malformed date '{0}' (expected YYYY-MM-DD)")]
    MalformedDate(String),

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parse a `YYYY-MM-DD` query parameter.
pub fn parse_date(s: &str) -> Result<NaiveDate, EngineError> {
    s.parse::<NaiveDate>()
        .map_err(|_| EngineError::MalformedDate(s.to_string()))
}

/// Resolve optional `start`/`end` query parameters into a concrete date
/// range: `end` defaults to `today`, `start` to `end - default_days`.
/// Rejects inverted ranges.
pub fn resolve_range(
    start: Option<&str>,
    end: Option<&str>,
    default_days: i64,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), EngineError> {
    let end_date = match end {
        Some(s) => parse_date(s)?,
        None => today,
    };
    let start_date = match start {
        Some(s) => parse_date(s)?,
        None => end_date - Days::new(default_days.max(0) as u64),
    };

    if start_date > end_date {
        return Err(EngineError::InvalidRange { start: start_date, end: end_date });
    }

    Ok((start_date, end_date))
}

/// Convert an inclusive date range into the half-open instant interval
/// `[start 00:00, end+1day 00:00)` used for intraday queries.
pub fn day_bounds(start: NaiveDate, end: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    (
        start.and_hms_opt(0, 0, 0).expect("midnight is always valid"),
        (end + Days::new(1))
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_resolve_range_defaults() {
        let today = date("2024-03-10");
        let (start, end) = resolve_range(None, None, 7, today).unwrap();
        assert_eq!(end, today);
        assert_eq!(start, date("2024-03-03"));
    }

    #[test]
    fn test_resolve_range_explicit() {
        let (start, end) =
            resolve_range(Some("2024-01-01"), Some("2024-02-01"), 7, date("2024-03-10")).unwrap();
        assert_eq!(start, date("2024-01-01"));
        assert_eq!(end, date("2024-02-01"));
    }

    #[test]
    fn test_resolve_range_rejects_inverted() {
        let err =
            resolve_range(Some("2024-02-01"), Some("2024-01-01"), 7, date("2024-03-10")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRange { .. }));
    }

    #[test]
    fn test_resolve_range_rejects_malformed() {
        let err = resolve_range(Some("not-a-date"), None, 7, date("2024-03-10")).unwrap_err();
        assert!(matches!(err, EngineError::MalformedDate(_)));
    }

    #[test]
    fn test_day_bounds_half_open() {
        let (start, end) = day_bounds(date("2024-01-15"), date("2024-01-15"));
        assert_eq!(start.to_string(), "2024-01-15 00:00:00");
        assert_eq!(end.to_string(), "2024-01-16 00:00:00");
    }
}
