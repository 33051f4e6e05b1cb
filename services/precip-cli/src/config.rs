//! Project layout and pipeline-wide options.

use std::path::{Path, PathBuf};

use precip_common::{MissingUnitPolicy, PrecipResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DATA_DIR: &str = "data_processed";
pub const FIGS_DIR: &str = "figs";

pub const REMAP_TIMEMEAN_FILE: &str = "gpm_remap_to_mpas_timemean.nc";
pub const REMAP_TIMESERIES_FILE: &str = "gpm_remap_to_mpas_timeseries.nc";
pub const SMOOTHED_FILE: &str = "gpm_smoothed.nc";
pub const WEIGHTS_FILE: &str = "weights_gpm_to_mpas.json";
pub const RADIAL_SPECTRA_FILE: &str = "radial_spectra.json";
pub const EFFICIENCY_FILE: &str = "spectral_efficiency.json";
pub const EFFICIENCY_FIGURE: &str = "eficiencia_espectral.png";

/// Resolved project directories.
///
/// Built once at startup and passed to every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPaths {
    pub root: PathBuf,
    /// Processed NetCDF and JSON outputs.
    pub data_dir: PathBuf,
    /// PNG figures.
    pub figs_dir: PathBuf,
}

impl ProjectPaths {
    /// Resolve `root` (current directory when `None`) and create the output
    /// directories if absent.
    pub fn resolve(root: Option<&Path>) -> PrecipResult<Self> {
        let root = match root {
            Some(r) => r.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let root = root.canonicalize().unwrap_or(root);
        let data_dir = root.join(DATA_DIR);
        let figs_dir = root.join(FIGS_DIR);
        std::fs::create_dir_all(&data_dir)?;
        std::fs::create_dir_all(&figs_dir)?;
        debug!(root = %root.display(), "Resolved project paths");

        Ok(Self {
            root,
            data_dir,
            figs_dir,
        })
    }

    /// Relative paths are taken from the project root.
    pub fn input(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Relative figure names are placed under `figs/`.
    pub fn figure(&self, name: &Path) -> PathBuf {
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.figs_dir.join(name)
        }
    }

    pub fn data(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    pub fn default_weights(&self) -> PathBuf {
        self.data(WEIGHTS_FILE)
    }

    /// The remapped GPM file: explicit path, else the time-mean file if it
    /// exists, else the time-series file.
    pub fn remapped_gpm(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return self.input(path);
        }
        let timemean = self.data(REMAP_TIMEMEAN_FILE);
        if timemean.exists() {
            timemean
        } else {
            self.data(REMAP_TIMESERIES_FILE)
        }
    }

    /// Smoothing input: explicit path, else the time-series file if it
    /// exists, else the time-mean file.
    pub fn smoothing_input(&self, explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return self.input(path);
        }
        let series = self.data(REMAP_TIMESERIES_FILE);
        if series.exists() {
            series
        } else {
            self.data(REMAP_TIMEMEAN_FILE)
        }
    }
}

/// Settings shared by every stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub missing_unit: MissingUnitPolicy,
}

impl PipelineOptions {
    pub fn from_flag(assume_missing_units_mm_per_hour: bool) -> Self {
        Self {
            missing_unit: if assume_missing_units_mm_per_hour {
                MissingUnitPolicy::AssumeMmPerHour
            } else {
                MissingUnitPolicy::Reject
            },
        }
    }
}
