//! `regrid`: GPM onto the MPAS grid.

use std::path::PathBuf;

use clap::Args;
use grid_processor::RegridWeights;
use netcdf_io::{Dataset, FieldWriter};
use precip_common::{PrecipResult, RateUnit};
use tracing::{info, warn};

use crate::config::{PipelineOptions, ProjectPaths, REMAP_TIMEMEAN_FILE, REMAP_TIMESERIES_FILE};
use crate::loaders::load_gpm_rate;

#[derive(Debug, Clone, Args)]
pub struct RegridArgs {
    /// Raw GPM/IMERG NetCDF file
    #[arg(long)]
    pub gpm: PathBuf,

    /// MPAS NetCDF file providing the target grid
    #[arg(long)]
    pub mpas: PathBuf,

    /// Weights file, reused when it matches both grids
    #[arg(long)]
    pub weights: Option<PathBuf>,

    /// Output rate unit (mm/h or mm/day)
    #[arg(long, default_value = "mm/h")]
    pub out_unit: RateUnit,

    /// Average over time before remapping
    #[arg(long)]
    pub time_mean: bool,

    /// Wrap source longitudes when bracketing target points
    #[arg(long)]
    pub periodic: bool,
}

pub fn run(paths: &ProjectPaths, options: &PipelineOptions, args: &RegridArgs) -> PrecipResult<PathBuf> {
    let gpm = load_gpm_rate(
        &paths.input(&args.gpm),
        args.out_unit,
        args.time_mean,
        options.missing_unit,
    )?;
    let target = Dataset::open(paths.input(&args.mpas))?.read_coords()?;

    let weights_path = match &args.weights {
        Some(p) => paths.input(p),
        None => paths.default_weights(),
    };
    let (weights, reused) =
        RegridWeights::load_or_build(&weights_path, &gpm.coords, &target, args.periodic)?;
    let coverage = weights.coverage();
    if coverage < 1.0 {
        warn!(
            coverage,
            source_extent = ?gpm.coords.extent(),
            target_extent = ?target.extent(),
            "Part of the MPAS grid lies outside the GPM domain and will be NaN"
        );
    }

    let remapped = weights
        .apply(&gpm.field)?
        .renamed("precipitation_rate")
        .with_units(args.out_unit.as_str())
        .with_long_name(format!(
            "GPM precipitation rate remapped to MPAS grid ({})",
            args.out_unit
        ));
    remapped.stats().log("remapped GPM");

    let file_name = if remapped.rank() == 3 {
        REMAP_TIMESERIES_FILE
    } else {
        REMAP_TIMEMEAN_FILE
    };
    let mut writer = FieldWriter::create(paths.data(file_name))?;
    writer.put_global_attribute("title", "GPM precipitation remapped to the MPAS grid")?;
    writer.write_coords(&target)?;
    if remapped.rank() == 3 {
        if let Some(times) = &gpm.times {
            writer.write_time(times)?;
        }
    }
    writer.write_field(
        &remapped,
        &[
            ("source", "GPM (standardized via load_gpm_rate)"),
            ("regridding", "bilinear"),
        ],
    )?;
    let out = writer.finish()?;

    info!(
        path = %out.display(),
        weights = %weights_path.display(),
        reused_weights = reused,
        shape = ?remapped.dims(),
        "Regrid complete"
    );
    Ok(out)
}
