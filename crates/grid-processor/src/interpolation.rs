//! Bilinear interpolation between four grid corners.

/// Bilinear blend of the four corners of a cell.
///
/// `v00` is the lower-row/lower-column corner, `v10` the same row at the next
/// column, `v01` the next row at the same column and `v11` the diagonal.
/// `xf` and `yf` are the fractional offsets in `[0, 1]` along columns and rows.
/// Returns `NaN` if any corner is `NaN`.
#[inline]
pub fn bilinear(v00: f32, v10: f32, v01: f32, v11: f32, xf: f32, yf: f32) -> f32 {
    if v00.is_nan() || v10.is_nan() || v01.is_nan() || v11.is_nan() {
        return f32::NAN;
    }

    let top = v00 * (1.0 - xf) + v10 * xf;
    let bottom = v01 * (1.0 - xf) + v11 * xf;
    top * (1.0 - yf) + bottom * yf
}

/// Locate `v` on a monotonic axis.
///
/// Returns the two bracketing indices and the fractional position between
/// them, or `None` if `v` lies outside the axis. Works for ascending and
/// descending axes. A single-point axis only matches its own value.
pub fn bracket(axis: &[f64], v: f64) -> Option<(usize, usize, f64)> {
    let n = axis.len();
    if n == 0 || !v.is_finite() {
        return None;
    }
    if n == 1 {
        return (axis[0] == v).then_some((0, 0, 0.0));
    }

    let sign = if axis[n - 1] >= axis[0] { 1.0 } else { -1.0 };
    let key = sign * v;
    if key < sign * axis[0] || key > sign * axis[n - 1] {
        return None;
    }

    let idx = axis.partition_point(|&a| sign * a <= key);
    let i = idx.saturating_sub(1).min(n - 2);
    let span = axis[i + 1] - axis[i];
    let frac = if span == 0.0 { 0.0 } else { (v - axis[i]) / span };
    Some((i, i + 1, frac.clamp(0.0, 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bilinear_corners_and_center() {
        assert_eq!(bilinear(1.0, 2.0, 3.0, 4.0, 0.0, 0.0), 1.0);
        assert_eq!(bilinear(1.0, 2.0, 3.0, 4.0, 1.0, 0.0), 2.0);
        assert_eq!(bilinear(1.0, 2.0, 3.0, 4.0, 0.0, 1.0), 3.0);
        assert_eq!(bilinear(1.0, 2.0, 3.0, 4.0, 1.0, 1.0), 4.0);
        assert!((bilinear(1.0, 2.0, 3.0, 4.0, 0.5, 0.5) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_bilinear_with_nan() {
        assert!(bilinear(1.0, f32::NAN, 3.0, 4.0, 0.5, 0.5).is_nan());
    }

    #[test]
    fn test_bracket_ascending() {
        let axis = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(bracket(&axis, 1.25), Some((1, 2, 0.25)));
        assert_eq!(bracket(&axis, 0.0), Some((0, 1, 0.0)));
        assert_eq!(bracket(&axis, 3.0), Some((2, 3, 1.0)));
        assert_eq!(bracket(&axis, 3.5), None);
        assert_eq!(bracket(&axis, -0.1), None);
    }

    #[test]
    fn test_bracket_descending() {
        let axis = [10.0, 5.0, 0.0];
        assert_eq!(bracket(&axis, 7.5), Some((0, 1, 0.5)));
        assert_eq!(bracket(&axis, 0.0), Some((1, 2, 1.0)));
        assert_eq!(bracket(&axis, 11.0), None);
    }
}
