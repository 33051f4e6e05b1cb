//! CF time axis decoding.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PrecipError, PrecipResult};

/// Parsed CF time units, e.g. `"hours since 2024-01-01 00:00:00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfTimeUnits {
    /// Milliseconds per unit step.
    pub step_ms: i64,
    pub epoch: DateTime<Utc>,
}

impl CfTimeUnits {
    /// Parse a `<unit> since <reference>` string.
    ///
    /// Accepts seconds, minutes, hours and days, with the reference written as
    /// a date, a date and time separated by a space or `T`, and an optional
    /// trailing `Z` or `UTC`.
    pub fn parse(units: &str) -> PrecipResult<Self> {
        let (step, reference) = units
            .split_once(" since ")
            .ok_or_else(|| PrecipError::InvalidTime(format!("not CF time units: {:?}", units)))?;

        let step_ms = match step.trim().to_lowercase().as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => 1_000,
            "minutes" | "minute" | "mins" | "min" => 60_000,
            "hours" | "hour" | "hrs" | "hr" | "h" => 3_600_000,
            "days" | "day" | "d" => 86_400_000,
            other => {
                return Err(PrecipError::InvalidTime(format!(
                    "unsupported time step '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            step_ms,
            epoch: parse_reference(reference)?,
        })
    }

    /// Convert an offset in units since the epoch to a timestamp.
    pub fn to_datetime(&self, offset: f64) -> PrecipResult<DateTime<Utc>> {
        if !offset.is_finite() {
            return Err(PrecipError::InvalidTime(format!(
                "non-finite time offset {}",
                offset
            )));
        }
        let ms = (offset * self.step_ms as f64).round();
        let out_of_range = || {
            PrecipError::InvalidTime(format!(
                "time offset {} is outside the representable range",
                offset
            ))
        };
        if ms.abs() >= i64::MAX as f64 {
            return Err(out_of_range());
        }
        Duration::try_milliseconds(ms as i64)
            .and_then(|d| self.epoch.checked_add_signed(d))
            .ok_or_else(out_of_range)
    }

    /// Convert a timestamp back to an offset in these units.
    pub fn to_offset(&self, time: DateTime<Utc>) -> f64 {
        (time - self.epoch).num_milliseconds() as f64 / self.step_ms as f64
    }
}

fn parse_reference(reference: &str) -> PrecipResult<DateTime<Utc>> {
    let cleaned = reference
        .trim()
        .trim_end_matches("UTC")
        .trim_end()
        .trim_end_matches('Z')
        .replace('T', " ");
    let cleaned = cleaned.trim();

    const FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];
    for fmt in FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(cleaned, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(PrecipError::InvalidTime(format!(
        "cannot parse reference time {:?}",
        reference
    )))
}

/// Ordered timestamps of a field's leading axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAxis {
    pub times: Vec<DateTime<Utc>>,
}

impl TimeAxis {
    pub fn new(times: Vec<DateTime<Utc>>) -> Self {
        Self { times }
    }

    /// Decode raw CF offsets with their `units` attribute.
    pub fn from_cf(values: &[f64], units: &str) -> PrecipResult<Self> {
        let cf = CfTimeUnits::parse(units)?;
        let times = values
            .iter()
            .map(|&v| cf.to_datetime(v))
            .collect::<PrecipResult<Vec<_>>>()?;
        Ok(Self { times })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Elapsed hours between consecutive timestamps (length `n - 1`).
    pub fn interval_hours(&self) -> Vec<f64> {
        self.times
            .windows(2)
            .map(|w| (w[1] - w[0]).num_milliseconds() as f64 / 3_600_000.0)
            .collect()
    }

    /// Drop the first timestamp, aligning the axis with differenced data.
    ///
    /// Each interval is labelled by its end time.
    pub fn interval_ends(&self) -> TimeAxis {
        TimeAxis {
            times: self.times.iter().skip(1).copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_hours_since() {
        let cf = CfTimeUnits::parse("hours since 2024-01-15 00:00:00").unwrap();
        let t = cf.to_datetime(6.0).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_imerg_style_units() {
        let cf = CfTimeUnits::parse("seconds since 1970-01-01 00:00:00 UTC").unwrap();
        assert_eq!(cf.epoch, Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(cf.step_ms, 1_000);
    }

    #[test]
    fn test_parse_iso_reference_with_z() {
        let cf = CfTimeUnits::parse("minutes since 2000-01-01T12:00:00Z").unwrap();
        let t = cf.to_datetime(30.0).unwrap();
        assert_eq!(t.hour(), 12);
        assert_eq!(t.minute(), 30);
    }

    #[test]
    fn test_parse_date_only_reference() {
        let cf = CfTimeUnits::parse("days since 2020-02-28").unwrap();
        let t = cf.to_datetime(1.0).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2020, 2, 29, 0, 0, 0).unwrap());
        assert!((cf.to_offset(t) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_huge_offsets_are_invalid_time() {
        let err = TimeAxis::from_cf(&[0.0, 1.0e15], "hours since 2024-01-01").unwrap_err();
        assert!(matches!(err, PrecipError::InvalidTime(_)), "{:?}", err);

        let cf = CfTimeUnits::parse("seconds since 1970-01-01").unwrap();
        assert!(matches!(cf.to_datetime(9.96921e36), Err(PrecipError::InvalidTime(_))));
        assert!(matches!(cf.to_datetime(-1.0e300), Err(PrecipError::InvalidTime(_))));
        assert!(cf.to_datetime(f64::NAN).is_err());
    }

    #[test]
    fn test_rejects_non_cf_units() {
        assert!(CfTimeUnits::parse("hours").is_err());
        assert!(CfTimeUnits::parse("fortnights since 2020-01-01").is_err());
    }

    #[test]
    fn test_interval_hours_follows_irregular_spacing() {
        let axis = TimeAxis::from_cf(&[0.0, 3.0, 6.0, 7.0], "hours since 2024-01-01").unwrap();
        assert_eq!(axis.interval_hours(), vec![3.0, 3.0, 1.0]);
        assert_eq!(axis.interval_ends().len(), 3);
    }
}
