//! `plot-map`: one time step of any gridded variable as a map.

use std::path::{Path, PathBuf};

use clap::Args;
use netcdf_io::Dataset;
use precip_common::{PrecipError, PrecipResult, VariableRole};
use renderer::{precipitation_map, FigureStyle};
use tracing::info;

use super::compare::map_origin;
use crate::config::ProjectPaths;

#[derive(Debug, Clone, Args)]
pub struct PlotMapArgs {
    /// NetCDF file, relative to data_processed/
    #[arg(long)]
    pub input: PathBuf,

    /// Variable to draw (defaults to the remapped precipitation)
    #[arg(long)]
    pub var: Option<String>,

    /// Time index of a 3D variable
    #[arg(long, default_value_t = 0)]
    pub time: usize,

    /// Figure file name, relative to figs/ (defaults to <var>_t<time>.png)
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Figure style (black or light)
    #[arg(long, default_value = "black")]
    pub style: FigureStyle,
}

pub fn run(paths: &ProjectPaths, args: &PlotMapArgs) -> PrecipResult<PathBuf> {
    let input = if args.input.is_absolute() {
        args.input.clone()
    } else {
        paths.data_dir.join(&args.input)
    };
    let ds = Dataset::open(&input)?;

    let name = match &args.var {
        Some(name) if ds.has_variable(name) => name.clone(),
        Some(name) => {
            return Err(PrecipError::MissingVariable(format!(
                "'{}' in {} (available: {})",
                name,
                input.display(),
                ds.variable_names().join(", ")
            )))
        }
        None => ds.resolve(VariableRole::RemappedPrecipitation)?.to_string(),
    };

    let field = ds.read_variable(&name)?;
    let field = match field.rank() {
        3 => field.slice(args.time)?,
        _ if args.time == 0 => field,
        _ => {
            return Err(PrecipError::dimension(format!(
                "'{}' has no time axis; only --time 0 is valid",
                name
            )))
        }
    };
    field.stats().log(&format!("{} t={}", name, args.time));

    let coords = ds.read_coords()?;
    let canvas = precipitation_map(&field, args.style, map_origin(&coords))?;
    let out = match &args.save {
        Some(file) => paths.figure(file),
        None => paths.figure(Path::new(&format!("{}_t{}.png", name, args.time))),
    };
    canvas.save_png(&out)?;

    info!(path = %out.display(), variable = %name, time = args.time, "Map written");
    Ok(out)
}
