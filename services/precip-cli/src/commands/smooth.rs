//! `smooth`: moving-mean and Gaussian versions of the remapped GPM.

use std::path::PathBuf;

use clap::Args;
use grid_processor::smooth_field;
use netcdf_io::{Dataset, FieldWriter};
use precip_common::{PrecipError, PrecipResult, VariableRole};
use tracing::info;

use crate::config::{ProjectPaths, SMOOTHED_FILE};
use crate::loaders::read_times_for;

#[derive(Debug, Clone, Args)]
pub struct SmoothArgs {
    /// Remapped GPM file (defaults to the time series, else the time mean)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Gaussian standard deviation in grid cells
    #[arg(long, default_value_t = 1.0)]
    pub sigma: f32,

    /// Worker threads (0 = one per core)
    #[arg(long, default_value_t = 0)]
    pub jobs: usize,
}

pub fn run(paths: &ProjectPaths, args: &SmoothArgs) -> PrecipResult<PathBuf> {
    let input = paths.smoothing_input(args.input.as_deref());
    if !input.exists() {
        return Err(PrecipError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found; run regrid first", input.display()),
        )));
    }

    let ds = Dataset::open(&input)?;
    let field = ds.read_field(VariableRole::RemappedPrecipitation)?;
    let coords = ds.read_coords()?;
    let times = read_times_for(&ds, &field)?;
    info!(path = %input.display(), shape = ?field.dims(), "Smoothing input");

    let smoothed = smooth_field(&field, args.sigma, args.jobs)?;
    let sigma = args.sigma.to_string();

    let mut writer = FieldWriter::create(paths.data(SMOOTHED_FILE))?;
    writer.put_global_attribute("title", "Smoothed GPM precipitation on the MPAS grid")?;
    writer.write_coords(&coords)?;
    if let Some(times) = &times {
        writer.write_time(times)?;
    }
    writer.write_field(&smoothed.moving_mean, &[("filter", "uniform 3x3")])?;
    writer.write_field(
        &smoothed.gaussian,
        &[("filter", "gaussian"), ("sigma", sigma.as_str())],
    )?;
    let out = writer.finish()?;

    info!(path = %out.display(), sigma = args.sigma, "Smoothing complete");
    Ok(out)
}
