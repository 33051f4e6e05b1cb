//! Bringing precipitation fields onto a common rate base.

use precip_common::{
    Field, MissingUnitPolicy, PrecipError, PrecipResult, PrecipUnit, RateUnit, TimeAxis,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Converts rate fields from their declared unit to a target rate unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitNormalizer {
    pub target: RateUnit,
    pub missing_unit: MissingUnitPolicy,
}

impl UnitNormalizer {
    pub fn new(target: RateUnit) -> Self {
        Self {
            target,
            missing_unit: MissingUnitPolicy::default(),
        }
    }

    pub fn with_missing_unit_policy(mut self, policy: MissingUnitPolicy) -> Self {
        self.missing_unit = policy;
        self
    }

    /// Convert `field` to the target unit and retag it.
    ///
    /// Fails with `UnrecognizedUnit` when the declared unit is unknown, or
    /// absent under the default policy.
    pub fn normalize(&self, field: &Field) -> PrecipResult<Field> {
        let source = PrecipUnit::from_attribute(field.units.as_deref(), self.missing_unit)?;
        if field.units.as_deref().map_or(true, |u| u.trim().is_empty()) {
            warn!(
                variable = %field.name,
                "No units attribute; assuming mm/h"
            );
        }

        let target = self.target;
        debug!(
            variable = %field.name,
            from = ?source,
            to = %target,
            "Normalizing units"
        );
        Ok(field
            .map(|v| target.convert(source, v))
            .with_units(target.as_str()))
    }
}

/// Options for turning accumulated depth into a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulationOptions {
    /// Mark negative increments (accumulator resets) as missing.
    pub drop_negative: bool,
    pub target: RateUnit,
}

impl Default for AccumulationOptions {
    fn default() -> Self {
        Self {
            drop_negative: true,
            target: RateUnit::MmPerHour,
        }
    }
}

/// Element-wise sum of two accumulators (e.g. convective + grid-scale).
pub fn sum_accumulators(a: &Field, b: &Field) -> PrecipResult<Field> {
    let total = a.zip_with(b, |x, y| x + y)?;
    Ok(total
        .renamed(format!("{}+{}", a.name, b.name))
        .with_units("mm"))
}

/// Difference an accumulated-depth field (mm) over time and divide each
/// increment by its own interval length.
///
/// The result has `nt - 1` slices, each labelled by the end of its interval.
pub fn accumulation_to_rate(
    acc: &Field,
    times: &TimeAxis,
    options: &AccumulationOptions,
) -> PrecipResult<Field> {
    let nt = acc.time_len().ok_or_else(|| {
        PrecipError::InvalidTime(format!(
            "accumulator '{}' has no time axis (shape {:?})",
            acc.name,
            acc.dims()
        ))
    })?;
    if nt < 2 {
        return Err(PrecipError::InvalidTime(format!(
            "need at least 2 time steps to difference '{}', got {}",
            acc.name, nt
        )));
    }
    if times.len() != nt {
        return Err(PrecipError::InvalidTime(format!(
            "time axis has {} entries but '{}' has {} steps",
            times.len(),
            acc.name,
            nt
        )));
    }

    let hours = times.interval_hours();
    if let Some((i, h)) = hours
        .iter()
        .enumerate()
        .find(|(_, h)| !(h.is_finite() && **h > 0.0))
    {
        return Err(PrecipError::InvalidTime(format!(
            "interval {} has non-positive length {} h",
            i, h
        )));
    }

    let (ny, nx) = acc.spatial_dims()?;
    let plane = ny * nx;
    let target = options.target;
    let mut data = Vec::with_capacity((nt - 1) * plane);
    let mut dropped = 0usize;

    for (i, &h) in hours.iter().enumerate() {
        let prev = &acc.data[i * plane..(i + 1) * plane];
        let next = &acc.data[(i + 1) * plane..(i + 2) * plane];
        for (&p, &n) in prev.iter().zip(next) {
            let rate = ((n - p) as f64 / h) as f32;
            if options.drop_negative && rate < 0.0 {
                dropped += 1;
                data.push(f32::NAN);
            } else {
                data.push(target.from_mm_per_hour(rate));
            }
        }
    }

    if dropped > 0 {
        warn!(
            variable = %acc.name,
            count = dropped,
            "Dropped negative accumulator increments"
        );
    }
    debug!(variable = %acc.name, intervals = nt - 1, ?hours, "Converted accumulation to rate");

    Ok(acc
        .derive(data, vec![nt - 1, ny, nx])
        .renamed("precipitation_rate")
        .with_units(target.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use test_utils::{accumulator_series, assert_approx_eq};

    fn axis(hours: &[i64]) -> TimeAxis {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        TimeAxis::new(hours.iter().map(|&h| t0 + Duration::hours(h)).collect())
    }

    #[test]
    fn test_normalize_kg_flux_to_mm_per_day() {
        let field = Field::new_2d("precipitation", vec![1.0, 0.5], 1, 2)
            .unwrap()
            .with_units("kg m-2 s-1");
        let out = UnitNormalizer::new(RateUnit::MmPerDay).normalize(&field).unwrap();
        assert_eq!(out.data, vec![86400.0, 43200.0]);
        assert_eq!(out.units.as_deref(), Some("mm/day"));
        assert_eq!(field.units.as_deref(), Some("kg m-2 s-1"));
    }

    #[test]
    fn test_normalize_rejects_missing_units_by_default() {
        let field = Field::new_2d("precipitation", vec![1.0], 1, 1).unwrap();
        let err = UnitNormalizer::default().normalize(&field).unwrap_err();
        assert!(matches!(err, PrecipError::UnrecognizedUnit(_)));

        let out = UnitNormalizer::default()
            .with_missing_unit_policy(MissingUnitPolicy::AssumeMmPerHour)
            .normalize(&field)
            .unwrap();
        assert_eq!(out.data, vec![1.0]);
        assert_eq!(out.units.as_deref(), Some("mm/h"));
    }

    #[test]
    fn test_accumulation_uses_per_interval_hours() {
        // 3 h then 1 h intervals
        let mut data = vec![0.0f32; 2];
        data.extend([3.0, 6.0]);
        data.extend([5.0, 7.0]);
        let acc = Field::new("rainc", data, vec![3, 1, 2]).unwrap();

        let rate =
            accumulation_to_rate(&acc, &axis(&[0, 3, 4]), &AccumulationOptions::default()).unwrap();
        assert_eq!(rate.dims(), &[2, 1, 2]);
        assert_eq!(rate.data, vec![1.0, 2.0, 2.0, 1.0]);
        assert_eq!(rate.units.as_deref(), Some("mm/h"));
    }

    #[test]
    fn test_accumulation_to_mm_per_day() {
        let acc = Field::new("acc", accumulator_series(2, 2, &[0.5, 1.5], 3.0), vec![3, 2, 2])
            .unwrap();
        let opts = AccumulationOptions {
            target: RateUnit::MmPerDay,
            ..Default::default()
        };
        let rate = accumulation_to_rate(&acc, &axis(&[0, 3, 6]), &opts).unwrap();
        assert_approx_eq!(rate.data[0], 12.0, 1e-5);
        assert_approx_eq!(rate.data[4], 36.0, 1e-5);
    }

    #[test]
    fn test_negative_increments_dropped_or_kept() {
        let acc = Field::new("acc", vec![10.0, 4.0], vec![2, 1, 1]).unwrap();
        let times = axis(&[0, 2]);

        let dropped = accumulation_to_rate(&acc, &times, &AccumulationOptions::default()).unwrap();
        assert!(dropped.data[0].is_nan());

        let opts = AccumulationOptions {
            drop_negative: false,
            ..Default::default()
        };
        let kept = accumulation_to_rate(&acc, &times, &opts).unwrap();
        assert_eq!(kept.data, vec![-3.0]);
    }

    #[test]
    fn test_accumulation_rejects_bad_time_axes() {
        let single = Field::new("acc", vec![1.0; 4], vec![1, 2, 2]).unwrap();
        let err = accumulation_to_rate(&single, &axis(&[0]), &AccumulationOptions::default())
            .unwrap_err();
        assert!(matches!(err, PrecipError::InvalidTime(_)));

        let acc = Field::new("acc", vec![1.0; 8], vec![2, 2, 2]).unwrap();
        let err = accumulation_to_rate(&acc, &axis(&[0, 1, 2]), &AccumulationOptions::default())
            .unwrap_err();
        assert!(matches!(err, PrecipError::InvalidTime(_)));

        let err = accumulation_to_rate(&acc, &axis(&[3, 3]), &AccumulationOptions::default())
            .unwrap_err();
        assert!(matches!(err, PrecipError::InvalidTime(_)));

        let flat = Field::new_2d("acc", vec![1.0; 4], 2, 2).unwrap();
        assert!(accumulation_to_rate(&flat, &axis(&[0, 1]), &AccumulationOptions::default()).is_err());
    }

    #[test]
    fn test_sum_accumulators_checks_shape() {
        let a = Field::new("rainc", vec![1.0; 8], vec![2, 2, 2]).unwrap();
        let b = Field::new("rainnc", vec![2.0; 8], vec![2, 2, 2]).unwrap();
        let total = sum_accumulators(&a, &b).unwrap();
        assert_eq!(total.data, vec![3.0; 8]);
        assert_eq!(total.name, "rainc+rainnc");

        let c = Field::new("rainnc", vec![2.0; 4], vec![1, 2, 2]).unwrap();
        assert!(matches!(sum_accumulators(&a, &c), Err(PrecipError::Dimension(_))));
    }
}
