//! `compare`: two-panel GPM versus MPAS precipitation map.

use std::path::{Path, PathBuf};

use clap::Args;
use precip_common::{GridCoords, PrecipResult, RateUnit};
use renderer::{comparison_figure, FigureStyle, Origin};
use tracing::{info, warn};

use crate::config::{PipelineOptions, ProjectPaths};
use crate::loaders::{load_mpas_rate, load_remapped_gpm, rows_ascend_north, MpasVariables};

#[derive(Debug, Clone, Args)]
pub struct CompareArgs {
    /// MPAS NetCDF file with rainc/rainnc accumulators
    #[arg(long)]
    pub mpas: PathBuf,

    /// Remapped GPM file (defaults to the time mean, else the time series)
    #[arg(long)]
    pub gpm_file: Option<PathBuf>,

    /// Figure style (black or light)
    #[arg(long, default_value = "black")]
    pub style: FigureStyle,

    #[command(flatten)]
    pub mpas_vars: MpasVariables,
}

pub fn run(paths: &ProjectPaths, options: &PipelineOptions, args: &CompareArgs) -> PrecipResult<PathBuf> {
    let gpm = load_remapped_gpm(
        &paths.remapped_gpm(args.gpm_file.as_deref()),
        RateUnit::MmPerDay,
        options.missing_unit,
    )?;
    let mpas = load_mpas_rate(&paths.input(&args.mpas), RateUnit::MmPerDay, true, &args.mpas_vars)?;

    if gpm.field.dims() != mpas.field.dims() {
        warn!(
            gpm = ?gpm.field.dims(),
            mpas = ?mpas.field.dims(),
            "GPM and MPAS grids differ; panels are drawn at their own resolution"
        );
    }
    gpm.field.stats().log("GPM (mm/day)");
    mpas.field.stats().log("MPAS (mm/day)");

    let figure = comparison_figure(&gpm.field, &mpas.field, args.style, map_origin(&mpas.coords))?;
    let out = paths.figure(Path::new(&format!("comparacao_gpm_mpas_{}.png", args.style)));
    figure.save_png(&out)?;

    info!(path = %out.display(), style = %args.style, "Comparison figure written");
    Ok(out)
}

/// Draw northern rows at the top of the panel.
pub(crate) fn map_origin(coords: &GridCoords) -> Origin {
    if rows_ascend_north(coords) {
        Origin::Lower
    } else {
        Origin::Upper
    }
}
