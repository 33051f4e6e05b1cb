//! Latitude/longitude coordinates of a field's spatial axes.

use serde::{Deserialize, Serialize};

use crate::error::{PrecipError, PrecipResult};

/// Geographic coordinates of a `(ny, nx)` grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GridCoords {
    /// One latitude per row and one longitude per column.
    Rectilinear { lat: Vec<f64>, lon: Vec<f64> },
    /// Per-cell latitude and longitude, both row-major `(ny, nx)`.
    Curvilinear {
        lat: Vec<f64>,
        lon: Vec<f64>,
        ny: usize,
        nx: usize,
    },
}

impl GridCoords {
    /// Build rectilinear coordinates, rejecting empty axes.
    pub fn rectilinear(lat: Vec<f64>, lon: Vec<f64>) -> PrecipResult<Self> {
        if lat.is_empty() || lon.is_empty() {
            return Err(PrecipError::dimension("coordinate axes must not be empty"));
        }
        Ok(GridCoords::Rectilinear { lat, lon })
    }

    /// Build curvilinear coordinates, checking both arrays fill `(ny, nx)`.
    pub fn curvilinear(lat: Vec<f64>, lon: Vec<f64>, ny: usize, nx: usize) -> PrecipResult<Self> {
        if ny == 0 || nx == 0 || lat.len() != ny * nx || lon.len() != ny * nx {
            return Err(PrecipError::dimension(format!(
                "2D coordinates of length {}/{} do not match {}x{}",
                lat.len(),
                lon.len(),
                ny,
                nx
            )));
        }
        Ok(GridCoords::Curvilinear { lat, lon, ny, nx })
    }

    /// Grid shape `(ny, nx)`.
    pub fn shape(&self) -> (usize, usize) {
        match self {
            GridCoords::Rectilinear { lat, lon } => (lat.len(), lon.len()),
            GridCoords::Curvilinear { ny, nx, .. } => (*ny, *nx),
        }
    }

    /// Latitude and longitude of cell `(row, col)`.
    #[inline]
    pub fn point(&self, row: usize, col: usize) -> (f64, f64) {
        match self {
            GridCoords::Rectilinear { lat, lon } => (lat[row], lon[col]),
            GridCoords::Curvilinear { lat, lon, nx, .. } => {
                (lat[row * nx + col], lon[row * nx + col])
            }
        }
    }

    /// Whether the grid is rectilinear.
    pub fn is_rectilinear(&self) -> bool {
        matches!(self, GridCoords::Rectilinear { .. })
    }

    /// `(min_lat, max_lat, min_lon, max_lon)` over all cells.
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        let (lat, lon) = match self {
            GridCoords::Rectilinear { lat, lon } => (lat, lon),
            GridCoords::Curvilinear { lat, lon, .. } => (lat, lon),
        };
        let (min_lat, max_lat) = min_max(lat);
        let (min_lon, max_lon) = min_max(lon);
        (min_lat, max_lat, min_lon, max_lon)
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
