//! Gridded precipitation fields.

use serde::{Deserialize, Serialize};

use crate::error::{PrecipError, PrecipResult};
use crate::stats::FieldStats;

/// A gridded scalar field stored row-major as `f32`.
///
/// `dims` follows NetCDF order: `(ny, nx)` for a single slice or
/// `(nt, ny, nx)` with a leading time axis. Missing samples are `NaN`.
/// Transforms never mutate a field in place; they return a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Variable name, used when writing the field back out.
    pub name: String,
    /// Row-major sample values.
    pub data: Vec<f32>,
    /// Array shape, slowest axis first.
    dims: Vec<usize>,
    /// Raw `units` attribute, if the source declared one.
    pub units: Option<String>,
    /// Optional descriptive name (CF `long_name`).
    pub long_name: Option<String>,
}

impl Field {
    /// Create a field, checking that `data` fills `dims` exactly.
    pub fn new(name: impl Into<String>, data: Vec<f32>, dims: Vec<usize>) -> PrecipResult<Self> {
        let expected: usize = dims.iter().product();
        if dims.is_empty() || data.len() != expected {
            return Err(PrecipError::dimension(format!(
                "data length {} does not match shape {:?}",
                data.len(),
                dims
            )));
        }
        Ok(Self {
            name: name.into(),
            data,
            dims,
            units: None,
            long_name: None,
        })
    }

    /// Create a 2D `(ny, nx)` field.
    pub fn new_2d(name: impl Into<String>, data: Vec<f32>, ny: usize, nx: usize) -> PrecipResult<Self> {
        Self::new(name, data, vec![ny, nx])
    }

    /// Stack equally sized 2D slices into a `(nt, ny, nx)` field.
    pub fn from_slices(
        name: impl Into<String>,
        slices: Vec<Vec<f32>>,
        ny: usize,
        nx: usize,
    ) -> PrecipResult<Self> {
        let nt = slices.len();
        let mut data = Vec::with_capacity(nt * ny * nx);
        for (t, slice) in slices.into_iter().enumerate() {
            if slice.len() != ny * nx {
                return Err(PrecipError::dimension(format!(
                    "slice {} has {} samples, expected {}x{}",
                    t,
                    slice.len(),
                    ny,
                    nx
                )));
            }
            data.extend(slice);
        }
        Self::new(name, data, vec![nt, ny, nx])
    }

    /// Builder-style setter for the unit tag.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Builder-style setter for the descriptive name.
    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = Some(long_name.into());
        self
    }

    /// Builder-style rename.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The trailing `(ny, nx)` axes. Fails for fields of rank below 2.
    pub fn spatial_dims(&self) -> PrecipResult<(usize, usize)> {
        match self.dims.as_slice() {
            [.., ny, nx] => Ok((*ny, *nx)),
            _ => Err(PrecipError::dimension(format!(
                "expected at least 2 dimensions, got {}D with shape {:?}",
                self.rank(),
                self.dims
            ))),
        }
    }

    /// Number of time steps for a 3D field, `None` otherwise.
    pub fn time_len(&self) -> Option<usize> {
        match self.dims.as_slice() {
            [nt, _, _] => Some(*nt),
            _ => None,
        }
    }

    /// Value at `(row, col)` of a 2D field.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        let nx = self.dims[self.dims.len() - 1];
        self.data[row * nx + col]
    }

    /// Iterate over the 2D slices of a 2D or 3D field.
    pub fn slices(&self) -> PrecipResult<std::slice::Chunks<'_, f32>> {
        self.require_rank_2_or_3("slices")?;
        let (ny, nx) = self.spatial_dims()?;
        Ok(self.data.chunks((ny * nx).max(1)))
    }

    /// Extract time step `t` of a 3D field as a new 2D field.
    pub fn slice(&self, t: usize) -> PrecipResult<Field> {
        let nt = self.time_len().ok_or_else(|| {
            PrecipError::dimension(format!("cannot index time on a {}D field", self.rank()))
        })?;
        if t >= nt {
            return Err(PrecipError::dimension(format!(
                "time index {} out of range for {} steps",
                t, nt
            )));
        }
        let (ny, nx) = self.spatial_dims()?;
        let start = t * ny * nx;
        let data = self.data[start..start + ny * nx].to_vec();
        Ok(self.derive(data, vec![ny, nx]))
    }

    /// NaN-skipping mean over the leading time axis.
    ///
    /// 2D fields are returned unchanged. Cells with no finite sample in any
    /// time step stay `NaN`.
    pub fn time_mean(&self) -> PrecipResult<Field> {
        match self.rank() {
            2 => Ok(self.clone()),
            3 => {
                let (ny, nx) = self.spatial_dims()?;
                let n = ny * nx;
                let mut sums = vec![0.0f64; n];
                let mut counts = vec![0u32; n];
                for slice in self.data.chunks(n.max(1)) {
                    for (i, &v) in slice.iter().enumerate() {
                        if !v.is_nan() {
                            sums[i] += v as f64;
                            counts[i] += 1;
                        }
                    }
                }
                let data = sums
                    .iter()
                    .zip(&counts)
                    .map(|(&s, &c)| if c == 0 { f32::NAN } else { (s / c as f64) as f32 })
                    .collect();
                Ok(self.derive(data, vec![ny, nx]))
            }
            r => Err(PrecipError::dimension(format!(
                "expected a 2D or 3D field, got {}D with shape {:?}",
                r, self.dims
            ))),
        }
    }

    /// Apply `f` to every sample, keeping shape and metadata.
    pub fn map<F>(&self, f: F) -> Field
    where
        F: Fn(f32) -> f32,
    {
        self.derive(self.data.iter().map(|&v| f(v)).collect(), self.dims.clone())
    }

    /// Combine two fields of identical shape sample by sample.
    pub fn zip_with<F>(&self, other: &Field, f: F) -> PrecipResult<Field>
    where
        F: Fn(f32, f32) -> f32,
    {
        if self.dims != other.dims {
            return Err(PrecipError::dimension(format!(
                "shape mismatch: {} {:?} vs {} {:?}",
                self.name, self.dims, other.name, other.dims
            )));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(self.derive(data, self.dims.clone()))
    }

    /// Replace every `NaN` with `value`, returning the new field and the
    /// number of samples replaced.
    pub fn fill_nan(&self, value: f32) -> (Field, usize) {
        let mut filled = 0;
        let data = self
            .data
            .iter()
            .map(|&v| {
                if v.is_nan() {
                    filled += 1;
                    value
                } else {
                    v
                }
            })
            .collect();
        (self.derive(data, self.dims.clone()), filled)
    }

    pub fn nan_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_nan()).count()
    }

    /// NaN-skipping summary statistics.
    pub fn stats(&self) -> FieldStats {
        FieldStats::compute(&self.data, &self.dims)
    }

    /// New field with the same name and metadata but different samples.
    pub fn derive(&self, data: Vec<f32>, dims: Vec<usize>) -> Field {
        Field {
            name: self.name.clone(),
            data,
            dims,
            units: self.units.clone(),
            long_name: self.long_name.clone(),
        }
    }

    fn require_rank_2_or_3(&self, op: &str) -> PrecipResult<()> {
        match self.rank() {
            2 | 3 => Ok(()),
            r => Err(PrecipError::dimension(format!(
                "{} expects a 2D or 3D field, got {}D with shape {:?}",
                op, r, self.dims
            ))),
        }
    }
}
