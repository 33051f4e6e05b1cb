//! Reading precipitation fields, coordinates and time axes.

use std::path::{Path, PathBuf};

use precip_common::{
    resolve, resolve_with_override, Field, GridCoords, PrecipError, PrecipResult, TimeAxis,
    VariableRole,
};
use tracing::debug;

use crate::attrs::{get_f64_attr, get_string_attr, missing_sentinels, silence_hdf5_errors};
use crate::error::NetCdfError;

/// An open NetCDF file.
pub struct Dataset {
    file: netcdf::File,
    path: PathBuf,
}

impl Dataset {
    /// Open a NetCDF file for reading.
    pub fn open(path: impl AsRef<Path>) -> PrecipResult<Self> {
        silence_hdf5_errors();

        let path = path.as_ref();
        let file =
            netcdf::open(path).map_err(|e| NetCdfError::open_failed(path.display(), e))?;
        debug!(path = %path.display(), "Opened NetCDF file");

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.file.variable(name).is_some()
    }

    pub fn variable_names(&self) -> Vec<String> {
        self.file.variables().map(|v| v.name()).collect()
    }

    /// Name of the variable playing `role` in this file.
    pub fn resolve(&self, role: VariableRole) -> PrecipResult<&'static str> {
        resolve(role, |name| self.has_variable(name))
    }

    /// Read the 2D or 3D variable playing `role`.
    pub fn read_field(&self, role: VariableRole) -> PrecipResult<Field> {
        let name = self.resolve(role)?;
        self.read_variable(name)
    }

    /// Read the variable for `role`, preferring an explicit name when given.
    pub fn read_field_named(&self, role: VariableRole, explicit: Option<&str>) -> PrecipResult<Field> {
        let name = resolve_with_override(role, explicit, |name| self.has_variable(name))?;
        self.read_variable(&name)
    }

    /// Read a 2D or 3D variable by name.
    ///
    /// Fill and missing values become `NaN`, `scale_factor`/`add_offset` are
    /// applied, and a trailing `(lon, lat)` axis pair is transposed to
    /// `(lat, lon)`.
    pub fn read_variable(&self, name: &str) -> PrecipResult<Field> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("variable '{}'", name)))?;

        let dim_names: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let dims: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        if !(2..=3).contains(&dims.len()) {
            return Err(PrecipError::dimension(format!(
                "variable '{}' has dimensions {:?}, expected (y, x) or (time, y, x)",
                name, dim_names
            )));
        }

        let raw: Vec<f32> = var
            .get_values::<f32, _>(..)
            .map_err(|e| NetCdfError::invalid_format(&format!("reading '{}'", name), e))?;

        let sentinels = missing_sentinels(&var);
        let scale = get_f64_attr(&var, "scale_factor").unwrap_or(1.0);
        let offset = get_f64_attr(&var, "add_offset").unwrap_or(0.0);
        let data: Vec<f32> = raw
            .iter()
            .map(|&v| {
                if v.is_nan() || sentinels.iter().any(|&s| v == s as f32) {
                    f32::NAN
                } else if scale == 1.0 && offset == 0.0 {
                    v
                } else {
                    (v as f64 * scale + offset) as f32
                }
            })
            .collect();

        let (data, dims) = if is_lon_lat_order(&dim_names) {
            debug!(variable = name, dims = ?dim_names, "Transposing (lon, lat) to (lat, lon)");
            transpose_spatial(data, &dims)
        } else {
            (data, dims)
        };

        let mut field = Field::new(name, data, dims)?;
        field.units = get_string_attr(&var, "units");
        field.long_name = get_string_attr(&var, "long_name");

        debug!(
            variable = name,
            shape = ?field.dims(),
            units = ?field.units,
            nans = field.nan_count(),
            "Read field"
        );
        Ok(field)
    }

    /// Read latitude and longitude.
    ///
    /// 1D coordinates give a rectilinear grid. 2D (or time-varying 3D, of
    /// which the first step is used) give a curvilinear grid.
    pub fn read_coords(&self) -> PrecipResult<GridCoords> {
        let lat_name = self.resolve(VariableRole::Latitude)?;
        let lon_name = self.resolve(VariableRole::Longitude)?;
        let (lat, lat_dims) = self.read_f64(lat_name)?;
        let (lon, lon_dims) = self.read_f64(lon_name)?;

        match (lat_dims.as_slice(), lon_dims.as_slice()) {
            ([_], [_]) => GridCoords::rectilinear(lat, lon),
            ([.., ny, nx], [.., ny2, nx2]) if ny == ny2 && nx == nx2 => {
                let n = ny * nx;
                GridCoords::curvilinear(lat[..n].to_vec(), lon[..n].to_vec(), *ny, *nx)
            }
            _ => Err(PrecipError::dimension(format!(
                "incompatible coordinate shapes: {} {:?}, {} {:?}",
                lat_name, lat_dims, lon_name, lon_dims
            ))),
        }
    }

    /// Decode the CF time coordinate.
    pub fn read_time_axis(&self) -> PrecipResult<TimeAxis> {
        let name = self.resolve(VariableRole::Time)?;
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("variable '{}'", name)))?;
        let units = get_string_attr(&var, "units").ok_or_else(|| {
            PrecipError::InvalidTime(format!(
                "time variable '{}' in {} has no units attribute",
                name,
                self.path.display()
            ))
        })?;
        let values: Vec<f64> = var
            .get_values::<f64, _>(..)
            .map_err(|e| NetCdfError::invalid_format(&format!("reading '{}'", name), e))?;

        let sentinels = missing_sentinels(&var);
        if let Some(i) = values
            .iter()
            .position(|v| sentinels.iter().any(|s| v == s || (*v as f32) == (*s as f32)))
        {
            return Err(PrecipError::InvalidTime(format!(
                "time variable '{}' in {} has a missing value at step {}",
                name,
                self.path.display(),
                i
            )));
        }

        TimeAxis::from_cf(&values, &units)
    }

    /// Whether a time coordinate is present.
    pub fn has_time_axis(&self) -> bool {
        self.resolve(VariableRole::Time).is_ok()
    }

    fn read_f64(&self, name: &str) -> PrecipResult<(Vec<f64>, Vec<usize>)> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| NetCdfError::MissingData(format!("variable '{}'", name)))?;
        let dims = var.dimensions().iter().map(|d| d.len()).collect();
        let values = var
            .get_values::<f64, _>(..)
            .map_err(|e| NetCdfError::invalid_format(&format!("reading '{}'", name), e))?;
        Ok((values, dims))
    }
}

fn is_lat_dim(name: &str) -> bool {
    VariableRole::Latitude.aliases().contains(&name) && name != "y"
}

fn is_lon_dim(name: &str) -> bool {
    VariableRole::Longitude.aliases().contains(&name) && name != "x"
}

/// True when the trailing two dimensions are `(lon, lat)`.
fn is_lon_lat_order(dim_names: &[String]) -> bool {
    match dim_names {
        [.., a, b] => is_lon_dim(a) && is_lat_dim(b),
        _ => false,
    }
}

/// Swap the trailing two axes of a 2D or 3D array.
fn transpose_spatial(data: Vec<f32>, dims: &[usize]) -> (Vec<f32>, Vec<usize>) {
    let (rows, cols) = match dims {
        [.., r, c] => (*r, *c),
        _ => return (data, dims.to_vec()),
    };
    let plane = rows * cols;
    let mut out = vec![0.0f32; data.len()];
    for (src, dst) in data.chunks(plane.max(1)).zip(out.chunks_mut(plane.max(1))) {
        for r in 0..rows {
            for c in 0..cols {
                dst[c * rows + r] = src[r * cols + c];
            }
        }
    }
    let mut new_dims = dims.to_vec();
    let n = new_dims.len();
    new_dims.swap(n - 2, n - 1);
    (out, new_dims)
}
