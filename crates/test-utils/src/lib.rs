//! Shared test utilities for the precip-spectra workspace.
//!
//! This crate provides common testing infrastructure including:
//! - A scratch project root
//! - Approximate-equality assertions
//! - Synthetic precipitation field generators
//!
//! Generators return plain row-major `Vec<f32>` so this crate stays free of
//! workspace dependencies.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod generators;
pub mod paths;

pub use generators::*;
pub use paths::*;

/// Approximate floating-point equality.
///
/// ```ignore
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Element-wise approximate equality of two sequences of equal length.
///
/// `NaN` matches `NaN`.
#[macro_export]
macro_rules! assert_all_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left = &$left;
        let right = &$right;
        assert_eq!(left.len(), right.len(), "length mismatch");
        for (i, (l, r)) in left.iter().zip(right.iter()).enumerate() {
            let l = *l as f64;
            let r = *r as f64;
            if l.is_nan() && r.is_nan() {
                continue;
            }
            if (l - r).abs() > $epsilon as f64 {
                panic!(
                    "assertion failed at index {}: `{:?}` vs `{:?}` (epsilon `{:?}`)",
                    i, l, r, $epsilon
                );
            }
        }
    }};
}
