//! Bilinear remapping from a rectilinear source grid to a target grid.
//!
//! Weights depend only on the two grids, so they are computed once,
//! persisted as JSON and reused across runs and time steps.

use std::path::Path;

use precip_common::{Field, GridCoords, PrecipError, PrecipResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::interpolation::{bilinear, bracket};

/// Source cell corners and fractional offsets for one target point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Stencil {
    row0: u32,
    row1: u32,
    col0: u32,
    col1: u32,
    yf: f32,
    xf: f32,
}

/// Precomputed bilinear remapping weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegridWeights {
    /// Source `(ny, nx)`.
    pub source_shape: (usize, usize),
    /// Target `(ny, nx)`.
    pub target_shape: (usize, usize),
    /// Whether longitude wraps around 360°.
    pub periodic: bool,
    /// One entry per target point, row-major. `None` lies outside the source.
    stencils: Vec<Option<Stencil>>,
}

impl RegridWeights {
    /// Compute weights for every target point.
    ///
    /// The source must be rectilinear. Target points outside the source
    /// extent get no stencil and regrid to `NaN`; with `periodic`, longitudes
    /// between the last and first source column are bridged across the seam.
    pub fn build(source: &GridCoords, target: &GridCoords, periodic: bool) -> PrecipResult<Self> {
        let (src_lat, src_lon) = match source {
            GridCoords::Rectilinear { lat, lon } => (lat, lon),
            GridCoords::Curvilinear { .. } => {
                return Err(PrecipError::dimension(
                    "regridding requires a rectilinear (1D lat/lon) source grid",
                ))
            }
        };
        if periodic && src_lon.len() >= 2 && src_lon[src_lon.len() - 1] < src_lon[0] {
            return Err(PrecipError::invalid_parameter(
                "periodic",
                "periodic longitude requires an ascending source longitude axis",
            ));
        }

        let (ty, tx) = target.shape();
        let mut stencils = Vec::with_capacity(ty * tx);
        let mut outside = 0usize;
        for row in 0..ty {
            for col in 0..tx {
                let (lat, lon) = target.point(row, col);
                let stencil = bracket(src_lat, lat).and_then(|(row0, row1, yf)| {
                    locate_lon(src_lon, lon, periodic).map(|(col0, col1, xf)| Stencil {
                        row0: row0 as u32,
                        row1: row1 as u32,
                        col0: col0 as u32,
                        col1: col1 as u32,
                        yf: yf as f32,
                        xf: xf as f32,
                    })
                });
                if stencil.is_none() {
                    outside += 1;
                }
                stencils.push(stencil);
            }
        }

        debug!(
            source = ?(src_lat.len(), src_lon.len()),
            target = ?(ty, tx),
            periodic,
            outside,
            "Built bilinear weights"
        );
        if outside == ty * tx {
            warn!("No target point falls inside the source grid");
        }

        Ok(Self {
            source_shape: (src_lat.len(), src_lon.len()),
            target_shape: (ty, tx),
            periodic,
            stencils,
        })
    }

    /// Read weights previously written with [`save`](Self::save).
    pub fn load(path: &Path) -> PrecipResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let weights: RegridWeights = serde_json::from_str(&text)?;
        let (ty, tx) = weights.target_shape;
        if weights.stencils.len() != ty * tx {
            return Err(PrecipError::dimension(format!(
                "weights file {} holds {} stencils for a {}x{} target",
                path.display(),
                weights.stencils.len(),
                ty,
                tx
            )));
        }
        Ok(weights)
    }

    /// Write the weights as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> PrecipResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    /// Reuse the weights at `path` when they match the grids, otherwise build
    /// and save fresh ones. Returns the weights and whether they were reused.
    pub fn load_or_build(
        path: &Path,
        source: &GridCoords,
        target: &GridCoords,
        periodic: bool,
    ) -> PrecipResult<(Self, bool)> {
        if path.exists() {
            match Self::load(path) {
                Ok(w) if w.matches(source, target, periodic) => {
                    info!(path = %path.display(), "Reusing existing weights");
                    return Ok((w, true));
                }
                Ok(_) => warn!(
                    path = %path.display(),
                    "Weights do not match the current grids; rebuilding"
                ),
                Err(e) => warn!(
                    path = %path.display(),
                    error = %e,
                    "Unreadable weights file; rebuilding"
                ),
            }
        }

        info!(path = %path.display(), "Creating new weights");
        let weights = Self::build(source, target, periodic)?;
        weights.save(path)?;
        Ok((weights, false))
    }

    /// Whether these weights were built for the given grid shapes.
    pub fn matches(&self, source: &GridCoords, target: &GridCoords, periodic: bool) -> bool {
        self.source_shape == source.shape()
            && self.target_shape == target.shape()
            && self.periodic == periodic
    }

    /// Fraction of target points covered by the source grid.
    pub fn coverage(&self) -> f64 {
        if self.stencils.is_empty() {
            return 0.0;
        }
        self.stencils.iter().filter(|s| s.is_some()).count() as f64 / self.stencils.len() as f64
    }

    /// Remap a 2D or 3D field slice by slice.
    pub fn apply(&self, field: &Field) -> PrecipResult<Field> {
        let (ny, nx) = field.spatial_dims()?;
        if (ny, nx) != self.source_shape {
            return Err(PrecipError::dimension(format!(
                "field '{}' is {}x{} but weights expect a {}x{} source",
                field.name, ny, nx, self.source_shape.0, self.source_shape.1
            )));
        }

        let (ty, tx) = self.target_shape;
        let mut data = Vec::with_capacity(field.time_len().unwrap_or(1) * ty * tx);
        for slice in field.slices()? {
            data.extend(self.stencils.iter().map(|stencil| match stencil {
                Some(s) => {
                    let at = |r: u32, c: u32| slice[r as usize * nx + c as usize];
                    bilinear(
                        at(s.row0, s.col0),
                        at(s.row0, s.col1),
                        at(s.row1, s.col0),
                        at(s.row1, s.col1),
                        s.xf,
                        s.yf,
                    )
                }
                None => f32::NAN,
            }));
        }

        let mut dims = field.dims().to_vec();
        let rank = dims.len();
        dims[rank - 2] = ty;
        dims[rank - 1] = tx;
        Ok(field.derive(data, dims))
    }
}

/// Bring `lon` into the 360° window starting at `start`.
fn wrap_lon(lon: f64, start: f64) -> f64 {
    start + (lon - start).rem_euclid(360.0)
}

fn locate_lon(axis: &[f64], lon: f64, periodic: bool) -> Option<(usize, usize, f64)> {
    let n = axis.len();
    if n == 0 {
        return None;
    }
    let lo = axis[0].min(axis[n - 1]);

    if let Some(hit) = bracket(axis, lon) {
        return Some(hit);
    }
    // Different longitude conventions, e.g. [-180, 180) against [0, 360).
    let wrapped = wrap_lon(lon, lo);
    if let Some(hit) = bracket(axis, wrapped) {
        return Some(hit);
    }

    if periodic && n >= 2 {
        let last = axis[n - 1];
        let seam_end = axis[0] + 360.0;
        if wrapped > last && wrapped < seam_end {
            return Some((n - 1, 0, (wrapped - last) / (seam_end - last)));
        }
    }
    None
}
