//! `run-all`: the whole chain with default settings.

use std::path::PathBuf;

use clap::Args;
use precip_common::{PrecipResult, RateUnit};
use renderer::FigureStyle;
use ::spectral::{CenterConvention, SpectrumNormalization};
use tracing::info;

use super::{compare, regrid, smooth, CompareArgs, RegridArgs, SmoothArgs, SpectralArgs, SpectralMode};
use crate::config::{PipelineOptions, ProjectPaths};
use crate::loaders::MpasVariables;

#[derive(Debug, Clone, Args)]
pub struct RunAllArgs {
    /// Raw GPM/IMERG NetCDF file
    #[arg(long)]
    pub gpm: PathBuf,

    /// MPAS NetCDF file
    #[arg(long)]
    pub mpas: PathBuf,

    /// Weights file, reused when it matches both grids
    #[arg(long)]
    pub weights: Option<PathBuf>,

    #[command(flatten)]
    pub mpas_vars: MpasVariables,
}

/// regrid (time series) → smooth → compare → spectral all.
///
/// The spectral stage keeps the full grid (no edge trim).
pub fn run(
    paths: &ProjectPaths,
    options: &PipelineOptions,
    args: &RunAllArgs,
) -> PrecipResult<Vec<PathBuf>> {
    let mut written = Vec::new();

    info!(stage = "regrid", "Starting stage");
    let remapped = regrid::run(
        paths,
        options,
        &RegridArgs {
            gpm: args.gpm.clone(),
            mpas: args.mpas.clone(),
            weights: args.weights.clone(),
            out_unit: RateUnit::MmPerHour,
            time_mean: false,
            periodic: false,
        },
    )?;
    written.push(remapped.clone());

    info!(stage = "smooth", "Starting stage");
    written.push(smooth::run(
        paths,
        &SmoothArgs {
            input: Some(remapped.clone()),
            sigma: 1.0,
            jobs: 0,
        },
    )?);

    info!(stage = "compare", "Starting stage");
    written.push(compare::run(
        paths,
        options,
        &CompareArgs {
            mpas: args.mpas.clone(),
            gpm_file: Some(remapped.clone()),
            style: FigureStyle::Black,
            mpas_vars: args.mpas_vars.clone(),
        },
    )?);

    info!(stage = "spectral", "Starting stage");
    written.extend(super::spectral::run(
        paths,
        options,
        &SpectralArgs {
            mode: SpectralMode::All,
            mpas: args.mpas.clone(),
            gpm_file: Some(remapped),
            unit: RateUnit::MmPerDay,
            normalize: false,
            trim: 0,
            sigma: 1.0,
            center: CenterConvention::IntegerFloor,
            spectrum_norm: SpectrumNormalization::Raw,
            show_2d: false,
            style: FigureStyle::Black,
            outfile: None,
            jobs: 0,
            mpas_vars: args.mpas_vars.clone(),
        },
    )?);

    info!(files = written.len(), "Pipeline complete");
    Ok(written)
}
