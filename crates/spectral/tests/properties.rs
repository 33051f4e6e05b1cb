//! Whole-pipeline properties of the spectral chain: field → spectrum → profile.

use precip_common::Field;
use spectral::{
    compute_spectrum, radial_mean, spectral_efficiency, standardize, CenterConvention,
    PowerSpectrum2D, SpectrumNormalization,
};
use test_utils::{assert_approx_eq, constant_grid, gaussian_blob, sinusoid_grid, with_nan_holes};

fn field(data: Vec<f32>, ny: usize, nx: usize) -> Field {
    Field::new_2d("precipitation", data, ny, nx).unwrap()
}

#[test]
fn test_ones_4x4_puts_all_power_in_bin_zero() {
    let ones = field(constant_grid(4, 4, 1.0), 4, 4);

    let raw = compute_spectrum(&ones, SpectrumNormalization::Raw).unwrap();
    let profile = radial_mean(&raw, CenterConvention::IntegerFloor);
    assert_approx_eq!(profile.values[0], 256.0, 1e-9);
    for v in &profile.values[1..] {
        assert_approx_eq!(*v, 0.0, 1e-9);
    }

    let per_cell = compute_spectrum(&ones, SpectrumNormalization::PerCell).unwrap();
    let profile = radial_mean(&per_cell, CenterConvention::IntegerFloor);
    assert_approx_eq!(profile.values[0], 16.0, 1e-9);
}

#[test]
fn test_zero_field_gives_zero_spectrum_and_profile() {
    let zeros = field(constant_grid(6, 10, 0.0), 6, 10);
    let spec = compute_spectrum(&zeros, SpectrumNormalization::Raw).unwrap();
    assert!(spec.values().iter().all(|&v| v == 0.0));

    for center in [CenterConvention::IntegerFloor, CenterConvention::Midpoint] {
        let profile = radial_mean(&spec, center);
        assert!(profile.values.iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_constant_spectrum_profile_is_constant_for_both_centers() {
    let spec = PowerSpectrum2D::from_values(vec![0.25; 15 * 11], &[15, 11]).unwrap();
    for center in [CenterConvention::IntegerFloor, CenterConvention::Midpoint] {
        let profile = radial_mean(&spec, center);
        assert_eq!(profile.center, center);
        for (v, n) in profile.values.iter().zip(&profile.counts) {
            if *n > 0 {
                assert_approx_eq!(*v, 0.25, 1e-12);
            } else {
                assert_eq!(*v, 0.0);
            }
        }
    }
}

#[test]
fn test_plane_wave_lands_in_its_wavenumber_bin() {
    let wave = field(sinusoid_grid(16, 16, 0, 3, 2.0), 16, 16);
    let spec = compute_spectrum(&wave, SpectrumNormalization::Raw).unwrap();
    let profile = radial_mean(&spec, CenterConvention::IntegerFloor);

    let peak = profile
        .values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    assert_eq!(peak, 3);
}

#[test]
fn test_smoother_field_has_less_high_frequency_power() {
    let sharp = field(gaussian_blob(32, 32, 16.0, 16.0, 1.0, 10.0), 32, 32);
    let broad = field(gaussian_blob(32, 32, 16.0, 16.0, 4.0, 10.0), 32, 32);

    let sharp_profile = radial_mean(
        &compute_spectrum(&standardize(&sharp), SpectrumNormalization::PerCell).unwrap(),
        CenterConvention::IntegerFloor,
    );
    let broad_profile = radial_mean(
        &compute_spectrum(&standardize(&broad), SpectrumNormalization::PerCell).unwrap(),
        CenterConvention::IntegerFloor,
    );

    let efficiency = spectral_efficiency(&broad_profile.values, &sharp_profile.values).unwrap();
    assert_eq!(efficiency.len(), sharp_profile.len());
    // beyond the lowest wavenumbers the broad blob keeps only a fraction of the power
    assert!(efficiency[8] < 1.0, "efficiency at k=8 was {}", efficiency[8]);
}

#[test]
fn test_missing_samples_do_not_poison_the_profile() {
    let data = with_nan_holes(constant_grid(8, 8, 1.0), 5);
    let holes = field(data, 8, 8);
    let spec = compute_spectrum(&holes, SpectrumNormalization::Raw).unwrap();
    let profile = radial_mean(&spec, CenterConvention::Midpoint);
    assert!(profile.values.iter().all(|v| v.is_finite()));
}

#[test]
fn test_efficiency_of_identical_profiles_is_one() {
    let blob = field(gaussian_blob(12, 12, 6.0, 6.0, 2.0, 1.0), 12, 12);
    let spec = compute_spectrum(&blob, SpectrumNormalization::Raw).unwrap();
    let profile = radial_mean(&spec, CenterConvention::IntegerFloor);
    let eff = spectral_efficiency(&profile.values, &profile.values).unwrap();
    for (e, v) in eff.iter().zip(&profile.values) {
        if *v > 0.0 {
            assert_approx_eq!(*e, 1.0, 1e-12);
        }
    }
}
