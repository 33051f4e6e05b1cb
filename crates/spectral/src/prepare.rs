//! Field preparation ahead of the FFT.

use precip_common::Field;
use tracing::warn;

/// Replace `NaN` samples with `value`, logging how many were filled.
pub fn fill_missing(field: &Field, value: f32) -> Field {
    let (filled, count) = field.fill_nan(value);
    if count > 0 {
        warn!(
            variable = %field.name,
            count,
            fill = value,
            "Filled missing samples before FFT"
        );
    }
    filled
}

/// Standardize to zero mean and unit spread: `(x - mean) / (std + 1e-12)`.
///
/// Statistics are taken over the non-`NaN` samples, `NaN` stays `NaN`, and
/// the unit tag becomes `normalized`.
pub fn standardize(field: &Field) -> Field {
    let stats = field.stats();
    let (mean, std) = if stats.mean.is_nan() {
        (0.0, 0.0)
    } else {
        (stats.mean, stats.std)
    };
    let denom = std + 1e-12;
    field
        .map(|v| ((v as f64 - mean) / denom) as f32)
        .with_units("normalized")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_standardize_zero_mean_unit_std() {
        let field = Field::new_2d("p", vec![1.0, 2.0, 3.0, 4.0], 2, 2)
            .unwrap()
            .with_units("mm/day");
        let out = standardize(&field);
        let stats = out.stats();
        assert_approx_eq!(stats.mean, 0.0, 1e-6);
        assert_approx_eq!(stats.std, 1.0, 1e-6);
        assert_eq!(out.units.as_deref(), Some("normalized"));
    }

    #[test]
    fn test_standardize_constant_field_is_zero() {
        let field = Field::new_2d("p", vec![5.0; 4], 2, 2).unwrap();
        assert!(standardize(&field).data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_fill_missing() {
        let field = Field::new_2d("p", vec![f32::NAN, 1.0], 1, 2).unwrap();
        assert_eq!(fill_missing(&field, 0.0).data, vec![0.0, 1.0]);
    }
}
