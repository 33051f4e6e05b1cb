//! Azimuthal averaging and spectral efficiency.

use std::fmt;
use std::str::FromStr;

use precip_common::{PrecipError, PrecipResult};
use serde::{Deserialize, Serialize};

use crate::spectrum::PowerSpectrum2D;

/// Replacement for zero denominator bins in [`spectral_efficiency`].
pub const EFFICIENCY_EPS: f64 = 1e-10;

/// Where radial distances are measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CenterConvention {
    /// `(ny / 2, nx / 2)` with integer division; the zero-frequency cell
    /// after FFT-shift.
    #[default]
    IntegerFloor,
    /// `((ny - 1) / 2, (nx - 1) / 2)`, the geometric middle of the array.
    Midpoint,
}

impl CenterConvention {
    pub fn center(self, ny: usize, nx: usize) -> (f64, f64) {
        match self {
            CenterConvention::IntegerFloor => ((ny / 2) as f64, (nx / 2) as f64),
            CenterConvention::Midpoint => (
                (ny as f64 - 1.0) / 2.0,
                (nx as f64 - 1.0) / 2.0,
            ),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CenterConvention::IntegerFloor => "integer-floor",
            CenterConvention::Midpoint => "midpoint",
        }
    }
}

impl fmt::Display for CenterConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CenterConvention {
    type Err = PrecipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "integer-floor" | "floor" => Ok(CenterConvention::IntegerFloor),
            "midpoint" | "mid" => Ok(CenterConvention::Midpoint),
            other => Err(PrecipError::invalid_parameter(
                "center",
                format!("unknown convention '{}'", other),
            )),
        }
    }
}

/// Mean power per integer radius bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialProfile {
    pub values: Vec<f64>,
    /// Cells contributing to each bin.
    pub counts: Vec<usize>,
    pub center: CenterConvention,
}

impl RadialProfile {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `log10(value + 1e-12)` per bin.
    pub fn log10(&self) -> Vec<f64> {
        self.values.iter().map(|v| (v + 1e-12).log10()).collect()
    }
}

/// Average the spectrum over rings of equal truncated distance from the center.
///
/// The profile has `floor(max_radius) + 1` bins, `max_radius` being the
/// distance to the farthest corner. Bins no cell falls into are zero.
pub fn radial_mean(spectrum: &PowerSpectrum2D, center: CenterConvention) -> RadialProfile {
    let (ny, nx) = spectrum.shape();
    let (cy, cx) = center.center(ny, nx);

    let corner = |y: f64, x: f64| ((y - cy).powi(2) + (x - cx).powi(2)).sqrt();
    let max_radius = [
        corner(0.0, 0.0),
        corner(0.0, (nx - 1) as f64),
        corner((ny - 1) as f64, 0.0),
        corner((ny - 1) as f64, (nx - 1) as f64),
    ]
    .into_iter()
    .fold(0.0f64, f64::max);
    let nbins = max_radius.floor() as usize + 1;

    let mut sums = vec![0.0f64; nbins];
    let mut counts = vec![0usize; nbins];
    for row in 0..ny {
        for col in 0..nx {
            let r = corner(row as f64, col as f64) as usize;
            let bin = r.min(nbins - 1);
            sums[bin] += spectrum.get(row, col);
            counts[bin] += 1;
        }
    }

    let values = sums
        .iter()
        .zip(&counts)
        .map(|(&s, &c)| s / c.max(1) as f64)
        .collect();

    RadialProfile {
        values,
        counts,
        center,
    }
}

/// Bin-wise ratio `numerator / denominator`, with zero denominator bins
/// replaced by [`EFFICIENCY_EPS`].
///
/// Fails with `Dimension` when the profiles differ in length.
pub fn spectral_efficiency(numerator: &[f64], denominator: &[f64]) -> PrecipResult<Vec<f64>> {
    if numerator.len() != denominator.len() {
        return Err(PrecipError::dimension(format!(
            "radial profiles differ in length: {} vs {}",
            numerator.len(),
            denominator.len()
        )));
    }
    Ok(numerator
        .iter()
        .zip(denominator)
        .map(|(&n, &d)| n / if d == 0.0 { EFFICIENCY_EPS } else { d })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_profile_length_follows_farthest_corner() {
        let spec = PowerSpectrum2D::from_values(vec![1.0; 64], &[8, 8]).unwrap();
        // center (4,4), farthest corner (0,0): sqrt(32) = 5.66
        assert_eq!(radial_mean(&spec, CenterConvention::IntegerFloor).len(), 6);
        // center (3.5,3.5): sqrt(24.5) = 4.95
        assert_eq!(radial_mean(&spec, CenterConvention::Midpoint).len(), 5);
    }

    #[test]
    fn test_constant_spectrum_gives_constant_profile() {
        let spec = PowerSpectrum2D::from_values(vec![3.5; 7 * 9], &[7, 9]).unwrap();
        for center in [CenterConvention::IntegerFloor, CenterConvention::Midpoint] {
            let profile = radial_mean(&spec, center);
            for (v, c) in profile.values.iter().zip(&profile.counts) {
                if *c > 0 {
                    assert_approx_eq!(*v, 3.5, 1e-12);
                }
            }
            assert_eq!(profile.counts.iter().sum::<usize>(), 63);
        }
    }

    #[test]
    fn test_bin_zero_is_the_center_cell() {
        let mut values = vec![0.0; 16];
        values[2 * 4 + 2] = 256.0;
        let spec = PowerSpectrum2D::from_values(values, &[4, 4]).unwrap();
        let profile = radial_mean(&spec, CenterConvention::IntegerFloor);
        assert_eq!(profile.values[0], 256.0);
        assert_eq!(profile.counts[0], 1);
        assert!(profile.values[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_efficiency_replaces_zero_denominators() {
        let eff = spectral_efficiency(&[2.0, 1.0, 0.0], &[4.0, 0.0, 0.0]).unwrap();
        assert_eq!(eff[0], 0.5);
        assert_eq!(eff[1], 1.0 / EFFICIENCY_EPS);
        assert_eq!(eff[2], 0.0);
    }

    #[test]
    fn test_efficiency_length_mismatch() {
        let err = spectral_efficiency(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, PrecipError::Dimension(_)));
    }

    #[test]
    fn test_center_convention_parsing() {
        assert_eq!(
            "midpoint".parse::<CenterConvention>().unwrap(),
            CenterConvention::Midpoint
        );
        assert_eq!(
            "integer-floor".parse::<CenterConvention>().unwrap(),
            CenterConvention::IntegerFloor
        );
        assert!("ring".parse::<CenterConvention>().is_err());
    }
}
