//! 2D power spectrum via FFT.

use std::fmt;
use std::str::FromStr;

use num_complex::Complex;
use precip_common::{Field, PrecipError, PrecipResult};
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prepare::fill_missing;

/// Scaling applied to the squared FFT magnitudes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpectrumNormalization {
    /// `|F|²`, unscaled.
    #[default]
    Raw,
    /// `|F|² / (ny·nx)`. A field of ones puts `ny·nx` in the DC cell.
    PerCell,
}

impl SpectrumNormalization {
    pub fn as_str(self) -> &'static str {
        match self {
            SpectrumNormalization::Raw => "raw",
            SpectrumNormalization::PerCell => "per-cell",
        }
    }
}

impl fmt::Display for SpectrumNormalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpectrumNormalization {
    type Err = PrecipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raw" => Ok(SpectrumNormalization::Raw),
            "per-cell" | "percell" => Ok(SpectrumNormalization::PerCell),
            other => Err(PrecipError::invalid_parameter(
                "spectrum-norm",
                format!("'{}' is not one of raw, per-cell", other),
            )),
        }
    }
}

/// Centred squared FFT magnitudes of a 2D field, row-major `f64`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSpectrum2D {
    values: Vec<f64>,
    ny: usize,
    nx: usize,
}

impl PowerSpectrum2D {
    /// Wrap precomputed power values.
    ///
    /// Fails with `Dimension` unless `dims` is 2D, non-empty and matches the
    /// value count, and with `InvalidParameter` on negative or `NaN` power.
    pub fn from_values(values: Vec<f64>, dims: &[usize]) -> PrecipResult<Self> {
        let (ny, nx) = match dims {
            [ny, nx] if *ny > 0 && *nx > 0 => (*ny, *nx),
            _ => {
                return Err(PrecipError::dimension(format!(
                    "power spectrum must be a non-empty 2D array, got shape {:?}",
                    dims
                )))
            }
        };
        if values.len() != ny * nx {
            return Err(PrecipError::dimension(format!(
                "{} power values for shape {:?}",
                values.len(),
                dims
            )));
        }
        if values.iter().any(|v| !(*v >= 0.0)) {
            return Err(PrecipError::invalid_parameter(
                "spectrum",
                "power values must be non-negative",
            ));
        }
        Ok(Self { values, ny, nx })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.nx + col]
    }

    /// Total power over all cells.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// `log10(power + 1e-12)` per cell, as drawn in spectrum panels.
    pub fn log10(&self) -> Vec<f64> {
        self.values.iter().map(|v| (v + 1e-12).log10()).collect()
    }
}

/// Rotate so index 0 lands at `n / 2`.
pub fn fftshift<T: Copy>(values: &mut [T]) {
    let n = values.len();
    values.rotate_right(n / 2);
}

/// Power spectrum of a 2D field, or of the time mean of a 3D field.
///
/// `NaN` samples are treated as zero. Fails with `Dimension` for other ranks
/// and for empty fields.
pub fn compute_spectrum(
    field: &Field,
    normalization: SpectrumNormalization,
) -> PrecipResult<PowerSpectrum2D> {
    let field = match field.rank() {
        2 => field.clone(),
        3 => field.time_mean()?,
        r => {
            return Err(PrecipError::dimension(format!(
                "spectrum needs a 2D field or a 3D field with leading time, got {}D {:?}",
                r,
                field.dims()
            )))
        }
    };
    let (ny, nx) = field.spatial_dims()?;
    if ny == 0 || nx == 0 {
        return Err(PrecipError::dimension(format!(
            "cannot compute the spectrum of an empty {}x{} field",
            ny, nx
        )));
    }
    let field = fill_missing(&field, 0.0);

    let mut buffer: Vec<Complex<f64>> = field
        .data
        .iter()
        .map(|&v| Complex::new(v as f64, 0.0))
        .collect();

    let mut planner = FftPlanner::new();
    let fft_rows = planner.plan_fft_forward(nx);
    let fft_cols = planner.plan_fft_forward(ny);

    for row in buffer.chunks_mut(nx) {
        fft_rows.process(row);
    }

    // Columns are gathered into a contiguous scratch line.
    let mut column = vec![Complex::new(0.0, 0.0); ny];
    for col in 0..nx {
        for (row, c) in column.iter_mut().enumerate() {
            *c = buffer[row * nx + col];
        }
        fft_cols.process(&mut column);
        for (row, c) in column.iter().enumerate() {
            buffer[row * nx + col] = *c;
        }
    }

    let scale = match normalization {
        SpectrumNormalization::Raw => 1.0,
        SpectrumNormalization::PerCell => 1.0 / (ny * nx) as f64,
    };
    let mut power: Vec<f64> = buffer.iter().map(|c| c.norm_sqr() * scale).collect();

    for row in power.chunks_mut(nx) {
        fftshift(row);
    }
    let mut shifted = vec![0.0f64; ny * nx];
    for row in 0..ny {
        let dst = (row + ny / 2) % ny;
        shifted[dst * nx..(dst + 1) * nx].copy_from_slice(&power[row * nx..(row + 1) * nx]);
    }
    let power = shifted;

    debug!(
        variable = %field.name,
        ny,
        nx,
        ?normalization,
        dc = power[(ny / 2) * nx + nx / 2],
        "Computed power spectrum"
    );
    PowerSpectrum2D::from_values(power, &[ny, nx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{assert_approx_eq, constant_grid, sinusoid_grid};

    #[test]
    fn test_normalization_parsing() {
        assert_eq!("raw".parse::<SpectrumNormalization>().unwrap(), SpectrumNormalization::Raw);
        assert_eq!(
            "per-cell".parse::<SpectrumNormalization>().unwrap(),
            SpectrumNormalization::PerCell
        );
        assert!("unit".parse::<SpectrumNormalization>().is_err());
    }

    #[test]
    fn test_fftshift_moves_zero_to_center() {
        let mut even = [0, 1, 2, 3];
        fftshift(&mut even);
        assert_eq!(even, [2, 3, 0, 1]);

        let mut odd = [0, 1, 2, 3, 4];
        fftshift(&mut odd);
        assert_eq!(odd, [3, 4, 0, 1, 2]);
    }

    #[test]
    fn test_constant_field_has_only_dc_power() {
        let field = Field::new_2d("p", constant_grid(4, 4, 1.0), 4, 4).unwrap();
        let raw = compute_spectrum(&field, SpectrumNormalization::Raw).unwrap();
        assert_approx_eq!(raw.get(2, 2), 256.0, 1e-9);
        assert_approx_eq!(raw.total(), 256.0, 1e-9);

        let per_cell = compute_spectrum(&field, SpectrumNormalization::PerCell).unwrap();
        assert_approx_eq!(per_cell.get(2, 2), 16.0, 1e-9);
    }

    #[test]
    fn test_plane_wave_power_location() {
        // kx = 2 along columns of an 8x8 grid
        let field = Field::new_2d("p", sinusoid_grid(8, 8, 0, 2, 1.0), 8, 8).unwrap();
        let spec = compute_spectrum(&field, SpectrumNormalization::Raw).unwrap();
        // |F| = N/2 = 32 at (0, ±2), shifted to row 4, cols 4±2
        assert_approx_eq!(spec.get(4, 6), 1024.0, 1e-3);
        assert_approx_eq!(spec.get(4, 2), 1024.0, 1e-3);
        assert_approx_eq!(spec.get(4, 4), 0.0, 1e-6);
    }

    #[test]
    fn test_3d_uses_time_mean() {
        let field = Field::from_slices(
            "p",
            vec![constant_grid(2, 2, 0.0), constant_grid(2, 2, 2.0)],
            2,
            2,
        )
        .unwrap();
        let spec = compute_spectrum(&field, SpectrumNormalization::Raw).unwrap();
        assert_eq!(spec.shape(), (2, 2));
        assert_approx_eq!(spec.get(1, 1), 16.0, 1e-9);
    }

    #[test]
    fn test_nan_samples_count_as_zero() {
        let field = Field::new_2d("p", vec![f32::NAN, 1.0, 1.0, 1.0], 2, 2).unwrap();
        let spec = compute_spectrum(&field, SpectrumNormalization::Raw).unwrap();
        assert_approx_eq!(spec.get(1, 1), 9.0, 1e-9);
        assert!(spec.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_rejects_bad_ranks() {
        let line = Field::new("p", vec![1.0; 4], vec![4]).unwrap();
        assert!(matches!(
            compute_spectrum(&line, SpectrumNormalization::Raw),
            Err(PrecipError::Dimension(_))
        ));
        let four_d = Field::new("p", vec![1.0; 16], vec![2, 2, 2, 2]).unwrap();
        assert!(compute_spectrum(&four_d, SpectrumNormalization::Raw).is_err());
    }

    #[test]
    fn test_from_values_checks_shape_and_sign() {
        assert!(PowerSpectrum2D::from_values(vec![1.0; 4], &[2, 2]).is_ok());
        assert!(matches!(
            PowerSpectrum2D::from_values(vec![1.0; 4], &[4]),
            Err(PrecipError::Dimension(_))
        ));
        assert!(PowerSpectrum2D::from_values(vec![1.0; 3], &[2, 2]).is_err());
        assert!(PowerSpectrum2D::from_values(vec![-1.0, 0.0, 0.0, 0.0], &[2, 2]).is_err());
    }
}
