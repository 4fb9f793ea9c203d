//! Turning typed-in dates into the epoch seconds that modification-time
//! filters compare against.

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::TreeplanError;

/// Date-and-time layouts tried in order. `%d/%m/%Y` is deliberately absent:
/// it collides with `%m/%d/%Y`.
///
/// Two-digit-year layouts come first: chrono's `%Y` also accepts a short
/// year, so `21/03/04` would otherwise read as the year 21.
pub const DATETIME_FORMATS: &[&str] = &[
    "%y/%m/%d %H:%M:%S",
    "%y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%Y %I:%M %p",
    "%Y/%m/%d %I:%M %p",
    "%Y/%m/%d %H:%M",
    "%Y%m%d%H%M%S",
];

/// Date-only layouts, read as local midnight.
pub const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y/%m/%d"];

/// Parse `s` with the first matching layout.
///
/// # Errors
///
/// [`TreeplanError::InvalidArgument`] listing the supported layouts when none
/// match.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, TreeplanError> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| {
            TreeplanError::InvalidArgument(format!(
                "{s:?} did not parse; supported formats: {}",
                supported_formats().join(", ")
            ))
        })
}

/// Parse `s` as local time and return seconds since the Unix epoch.
///
/// # Errors
///
/// As [`parse_datetime`], plus `InvalidArgument` for a wall-clock time that
/// does not exist locally (skipped by a DST change).
pub fn parse_timestamp(s: &str) -> Result<f64, TreeplanError> {
    let naive = parse_datetime(s)?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| {
            TreeplanError::InvalidArgument(format!("{naive} does not exist in local time"))
        })?;
    Ok(local.timestamp_micros() as f64 / 1_000_000.0)
}

pub fn supported_formats() -> Vec<&'static str> {
    DATETIME_FORMATS
        .iter()
        .chain(DATE_FORMATS.iter())
        .copied()
        .collect()
}
