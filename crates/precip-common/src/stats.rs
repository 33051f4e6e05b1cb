//! Summary statistics for diagnostic logging.

use serde::{Deserialize, Serialize};
use tracing::info;

/// NaN-skipping summary of a field's samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    pub shape: Vec<usize>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub nan_count: usize,
}

impl FieldStats {
    /// Compute statistics over the non-NaN samples of `values`.
    ///
    /// All moments are `NaN` when every sample is missing.
    pub fn compute(values: &[f32], shape: &[usize]) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0f64;
        let mut count = 0usize;
        let mut nan_count = 0usize;

        for &v in values {
            if v.is_nan() {
                nan_count += 1;
                continue;
            }
            let v = v as f64;
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }

        if count == 0 {
            return Self {
                shape: shape.to_vec(),
                min: f64::NAN,
                max: f64::NAN,
                mean: f64::NAN,
                std: f64::NAN,
                nan_count,
            };
        }

        let mean = sum / count as f64;
        let var = values
            .iter()
            .filter(|v| !v.is_nan())
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / count as f64;

        Self {
            shape: shape.to_vec(),
            min,
            max,
            mean,
            std: var.sqrt(),
            nan_count,
        }
    }

    /// Emit the statistics as a single structured log event.
    pub fn log(&self, label: &str) {
        info!(
            label = label,
            shape = ?self.shape,
            min = format_args!("{:.4}", self.min),
            max = format_args!("{:.4}", self.max),
            mean = format_args!("{:.4}", self.mean),
            std = format_args!("{:.4}", self.std),
            nans = self.nan_count,
            "Field statistics"
        );
    }
}
