//! Transforms chained the way the comparison pipeline uses them.

use grid_processor::{
    accumulation_to_rate, smooth_field, sum_accumulators, trim_edges, AccumulationOptions,
    RegridWeights, UnitNormalizer,
};
use precip_common::{Field, GridCoords, RateUnit, TimeAxis};
use test_utils::{accumulator_series, assert_approx_eq, constant_grid, linspace_axis};

#[test]
fn test_gpm_normalize_regrid_trim() {
    let gpm = Field::from_slices(
        "precipitation",
        vec![constant_grid(6, 8, 1.0), constant_grid(6, 8, 3.0)],
        6,
        8,
    )
    .unwrap()
    .with_units("mm/hr");

    let rate = UnitNormalizer::new(RateUnit::MmPerDay).normalize(&gpm).unwrap();
    let mean = rate.time_mean().unwrap();
    assert_eq!(mean.data[0], 48.0);

    let source =
        GridCoords::rectilinear(linspace_axis(-3.0, 1.0, 6), linspace_axis(-4.0, 1.0, 8)).unwrap();
    let target =
        GridCoords::rectilinear(linspace_axis(-2.5, 0.5, 9), linspace_axis(-3.5, 0.5, 12))
            .unwrap();
    let weights = RegridWeights::build(&source, &target, false).unwrap();
    let remapped = weights.apply(&mean).unwrap();
    assert_eq!(remapped.dims(), &[9, 12]);
    assert_eq!(remapped.units.as_deref(), Some("mm/day"));

    let trimmed = trim_edges(&remapped, 2).unwrap();
    assert_eq!(trimmed.dims(), &[5, 8]);
    for v in &trimmed.data {
        assert_approx_eq!(*v, 48.0, 1e-4);
    }
}

#[test]
fn test_mpas_accumulators_to_smoothed_rate() {
    let t0 = chrono::DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let times = TimeAxis::new(
        (0..4)
            .map(|i| t0 + chrono::Duration::hours(3 * i))
            .collect(),
    );

    let rainc =
        Field::new("rainc", accumulator_series(5, 5, &[0.2, 0.4, 0.6], 3.0), vec![4, 5, 5]).unwrap();
    let rainnc =
        Field::new("rainnc", accumulator_series(5, 5, &[0.8, 0.6, 0.4], 3.0), vec![4, 5, 5])
            .unwrap();

    let total = sum_accumulators(&rainc, &rainnc).unwrap();
    let rate = accumulation_to_rate(&total, &times, &AccumulationOptions::default()).unwrap();
    assert_eq!(rate.time_len(), Some(3));
    for v in &rate.data {
        assert_approx_eq!(*v, 1.0, 1e-5);
    }

    let smoothed = smooth_field(&rate, 1.0, 2).unwrap();
    assert_eq!(smoothed.gaussian.dims(), rate.dims());
    assert_approx_eq!(smoothed.gaussian.data[12], 1.0, 1e-5);
}
