//! Writing derived fields to CF-style NetCDF files.

use std::path::{Path, PathBuf};

use precip_common::{CfTimeUnits, Field, GridCoords, PrecipError, PrecipResult, TimeAxis};
use tracing::{debug, info};

use crate::attrs::{silence_hdf5_errors, FILL_VALUE_F32};
use crate::error::NetCdfError;

const TIME_UNITS: &str = "seconds since 1970-01-01 00:00:00";

/// Incrementally writes coordinates, a time axis and fields to a new file.
///
/// Dimensions are created on first use: `lat`/`lon` for rectilinear
/// coordinates, `y`/`x` for curvilinear ones or when fields are written
/// without coordinates, and `time` for 3D fields.
pub struct FieldWriter {
    file: netcdf::FileMut,
    path: PathBuf,
    spatial: Option<SpatialDims>,
    time_len: Option<usize>,
    fields_written: usize,
}

struct SpatialDims {
    y: &'static str,
    x: &'static str,
    ny: usize,
    nx: usize,
}

fn nc_err(context: &str, err: netcdf::Error) -> PrecipError {
    NetCdfError::invalid_format(context, err).into()
}

impl FieldWriter {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> PrecipResult<Self> {
        silence_hdf5_errors();

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file =
            netcdf::create(path).map_err(|e| NetCdfError::open_failed(path.display(), e))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            spatial: None,
            time_len: None,
            fields_written: 0,
        })
    }

    /// Add a global attribute such as `title` or `history`.
    pub fn put_global_attribute(&mut self, name: &str, value: &str) -> PrecipResult<()> {
        self.file
            .add_attribute(name, value)
            .map_err(|e| nc_err(&format!("global attribute '{}'", name), e))?;
        Ok(())
    }

    /// Write latitude and longitude coordinate variables.
    pub fn write_coords(&mut self, coords: &GridCoords) -> PrecipResult<()> {
        if self.spatial.is_some() {
            return Err(PrecipError::InternalError(
                "coordinates must be written before any field".to_string(),
            ));
        }
        let (ny, nx) = coords.shape();

        match coords {
            GridCoords::Rectilinear { lat, lon } => {
                self.add_spatial("lat", "lon", ny, nx)?;
                self.put_coord("lat", &["lat"], lat, "latitude", "degrees_north")?;
                self.put_coord("lon", &["lon"], lon, "longitude", "degrees_east")?;
            }
            GridCoords::Curvilinear { lat, lon, .. } => {
                self.add_spatial("y", "x", ny, nx)?;
                self.put_coord("lat", &["y", "x"], lat, "latitude", "degrees_north")?;
                self.put_coord("lon", &["y", "x"], lon, "longitude", "degrees_east")?;
            }
        }
        debug!(ny, nx, rectilinear = coords.is_rectilinear(), "Wrote coordinates");
        Ok(())
    }

    /// Write the time coordinate as seconds since the Unix epoch.
    pub fn write_time(&mut self, axis: &TimeAxis) -> PrecipResult<()> {
        if self.time_len.is_some() {
            return Err(PrecipError::InternalError(
                "time axis already defined".to_string(),
            ));
        }
        self.add_time(axis.len())?;

        let cf = CfTimeUnits::parse(TIME_UNITS)?;
        let seconds: Vec<f64> = axis.times.iter().map(|&t| cf.to_offset(t)).collect();
        let mut var = self
            .file
            .add_variable::<f64>("time", &["time"])
            .map_err(|e| nc_err("time variable", e))?;
        var.put_attribute("standard_name", "time")
            .map_err(|e| nc_err("time attributes", e))?;
        var.put_attribute("units", TIME_UNITS)
            .map_err(|e| nc_err("time attributes", e))?;
        var.put_attribute("calendar", "standard")
            .map_err(|e| nc_err("time attributes", e))?;
        var.put_values(&seconds, ..)
            .map_err(|e| nc_err("time values", e))?;
        Ok(())
    }

    /// Write a 2D or 3D field. `NaN` samples are stored as `_FillValue`.
    ///
    /// `extra_attrs` are written after `units` and `long_name`.
    pub fn write_field(&mut self, field: &Field, extra_attrs: &[(&str, &str)]) -> PrecipResult<()> {
        let (ny, nx) = field.spatial_dims()?;

        match self.spatial.as_ref().map(|s| (s.ny, s.nx)) {
            Some(grid) if grid != (ny, nx) => {
                return Err(PrecipError::dimension(format!(
                    "field '{}' is {}x{} but the file grid is {}x{}",
                    field.name, ny, nx, grid.0, grid.1
                )))
            }
            Some(_) => {}
            None => self.add_spatial("y", "x", ny, nx)?,
        }
        let (y_dim, x_dim) = match &self.spatial {
            Some(s) => (s.y, s.x),
            None => return Err(PrecipError::InternalError("spatial dims missing".to_string())),
        };

        let dim_names: Vec<&str> = match field.time_len() {
            Some(nt) => {
                match self.time_len {
                    Some(existing) if existing != nt => {
                        return Err(PrecipError::dimension(format!(
                            "field '{}' has {} time steps but the file has {}",
                            field.name, nt, existing
                        )))
                    }
                    Some(_) => {}
                    None => self.add_time(nt)?,
                }
                vec!["time", y_dim, x_dim]
            }
            None if field.rank() == 2 => vec![y_dim, x_dim],
            None => {
                return Err(PrecipError::dimension(format!(
                    "cannot write {}D field '{}'",
                    field.rank(),
                    field.name
                )))
            }
        };

        let values: Vec<f32> = field
            .data
            .iter()
            .map(|&v| if v.is_nan() { FILL_VALUE_F32 } else { v })
            .collect();

        let context = format!("variable '{}'", field.name);
        let mut var = self
            .file
            .add_variable::<f32>(&field.name, &dim_names)
            .map_err(|e| nc_err(&context, e))?;
        var.put_attribute("_FillValue", FILL_VALUE_F32)
            .map_err(|e| nc_err(&context, e))?;
        if let Some(units) = &field.units {
            var.put_attribute("units", units.as_str())
                .map_err(|e| nc_err(&context, e))?;
        }
        if let Some(long_name) = &field.long_name {
            var.put_attribute("long_name", long_name.as_str())
                .map_err(|e| nc_err(&context, e))?;
        }
        for (name, value) in extra_attrs {
            var.put_attribute(name, *value)
                .map_err(|e| nc_err(&context, e))?;
        }
        var.put_values(&values, ..)
            .map_err(|e| nc_err(&context, e))?;

        self.fields_written += 1;
        debug!(variable = %field.name, shape = ?field.dims(), "Wrote field");
        Ok(())
    }

    /// Close the file and return its path.
    pub fn finish(self) -> PrecipResult<PathBuf> {
        let FieldWriter {
            file,
            path,
            fields_written,
            ..
        } = self;
        drop(file);
        info!(path = %path.display(), fields = fields_written, "Saved NetCDF");
        Ok(path)
    }

    fn add_spatial(&mut self, y: &'static str, x: &'static str, ny: usize, nx: usize) -> PrecipResult<()> {
        self.file
            .add_dimension(y, ny)
            .map_err(|e| nc_err(&format!("dimension '{}'", y), e))?;
        self.file
            .add_dimension(x, nx)
            .map_err(|e| nc_err(&format!("dimension '{}'", x), e))?;
        self.spatial = Some(SpatialDims { y, x, ny, nx });
        Ok(())
    }

    fn add_time(&mut self, nt: usize) -> PrecipResult<()> {
        self.file
            .add_dimension("time", nt)
            .map_err(|e| nc_err("dimension 'time'", e))?;
        self.time_len = Some(nt);
        Ok(())
    }

    fn put_coord(
        &mut self,
        name: &str,
        dims: &[&str],
        values: &[f64],
        standard_name: &str,
        units: &str,
    ) -> PrecipResult<()> {
        let context = format!("coordinate '{}'", name);
        let mut var = self
            .file
            .add_variable::<f64>(name, dims)
            .map_err(|e| nc_err(&context, e))?;
        var.put_attribute("standard_name", standard_name)
            .map_err(|e| nc_err(&context, e))?;
        var.put_attribute("units", units)
            .map_err(|e| nc_err(&context, e))?;
        var.put_values(values, ..)
            .map_err(|e| nc_err(&context, e))?;
        Ok(())
    }
}
