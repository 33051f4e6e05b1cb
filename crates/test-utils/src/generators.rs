//! Synthetic precipitation-like fields with known spectral content.
//!
//! All generators return row-major `Vec<f32>` of length `ny * nx`
//! (or `nt * ny * nx` for time series).

use std::f32::consts::PI;

/// A grid filled with one value.
pub fn constant_grid(ny: usize, nx: usize, value: f32) -> Vec<f32> {
    vec![value; ny * nx]
}

/// A grid whose value encodes its position: `row * 1000 + col`.
///
/// ```
/// use test_utils::index_grid;
///
/// let grid = index_grid(3, 4);
/// assert_eq!(grid[0], 0.0);
/// assert_eq!(grid[5], 1001.0); // row 1, col 1
/// ```
pub fn index_grid(ny: usize, nx: usize) -> Vec<f32> {
    (0..ny)
        .flat_map(|row| (0..nx).map(move |col| (row * 1000 + col) as f32))
        .collect()
}

/// A plane wave `amplitude * cos(2π (ky·row/ny + kx·col/nx))`.
///
/// Integer wavenumbers put all power in the two FFT bins at `±(ky, kx)`.
pub fn sinusoid_grid(ny: usize, nx: usize, ky: usize, kx: usize, amplitude: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(ny * nx);
    for row in 0..ny {
        for col in 0..nx {
            let phase = 2.0 * PI
                * (ky as f32 * row as f32 / ny as f32 + kx as f32 * col as f32 / nx as f32);
            data.push(amplitude * phase.cos());
        }
    }
    data
}

/// A Gaussian rain cell of peak `peak` centred at `(cy, cx)` with width `sigma` cells.
pub fn gaussian_blob(ny: usize, nx: usize, cy: f32, cx: f32, sigma: f32, peak: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity(ny * nx);
    let denom = 2.0 * sigma * sigma;
    for row in 0..ny {
        for col in 0..nx {
            let dy = row as f32 - cy;
            let dx = col as f32 - cx;
            data.push(peak * (-(dx * dx + dy * dy) / denom).exp());
        }
    }
    data
}

/// An accumulated-depth series: slice `t` equals `rates[..t].sum() * hours` per cell,
/// where each interval lasts `hours`.
///
/// Every cell accumulates at the same rate, so the recovered rate for interval
/// `i` is exactly `rates[i]` mm/h.
pub fn accumulator_series(ny: usize, nx: usize, rates: &[f32], hours: f32) -> Vec<f32> {
    let mut data = Vec::with_capacity((rates.len() + 1) * ny * nx);
    let mut total = 0.0f32;
    data.extend(std::iter::repeat(total).take(ny * nx));
    for &rate in rates {
        total += rate * hours;
        data.extend(std::iter::repeat(total).take(ny * nx));
    }
    data
}

/// Evenly spaced axis values `start, start + step, ...` with `n` entries.
pub fn linspace_axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Overwrite every `stride`-th sample with `NaN`.
pub fn with_nan_holes(mut data: Vec<f32>, stride: usize) -> Vec<f32> {
    if stride == 0 {
        return data;
    }
    for v in data.iter_mut().step_by(stride) {
        *v = f32::NAN;
    }
    data
}
