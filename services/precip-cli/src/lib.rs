//! GPM x MPAS precipitation comparison pipeline.
//!
//! Each stage reads its inputs from disk and writes NetCDF, PNG or JSON
//! outputs under the project root:
//!
//! ```text
//! regrid ──► data_processed/gpm_remap_to_mpas_{timemean,timeseries}.nc
//! smooth ──► data_processed/gpm_smoothed.nc
//! compare ─► figs/comparacao_gpm_mpas_<style>.png
//! spectral ► figs/espectros_precipitacao_<style>.png, figs/eficiencia_espectral.png
//!            data_processed/radial_spectra.json, data_processed/spectral_efficiency.json
//! plot-map ► figs/<var>_t<time>.png
//! ```

pub mod commands;
pub mod config;
pub mod loaders;

pub use config::{PipelineOptions, ProjectPaths};
