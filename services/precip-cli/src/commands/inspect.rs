//! `inspect`: summary statistics of the processed files.

use std::path::{Path, PathBuf};

use clap::Args;
use netcdf_io::Dataset;
use precip_common::{FieldStats, PrecipResult, RateUnit, VariableRole};
use tracing::{info, warn};

use crate::config::{ProjectPaths, SMOOTHED_FILE};
use crate::loaders::{load_mpas_rate, MpasVariables};

/// Prefix shared by every smoothed precipitation variable.
const SMOOTHED_PREFIX: &str = "precipitation_";

#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Remapped GPM file (defaults to the time mean, else the time series)
    #[arg(long)]
    pub gpm_file: Option<PathBuf>,

    /// Smoothed GPM file
    #[arg(long)]
    pub smoothed_file: Option<PathBuf>,

    /// Also summarize an MPAS file as a daily rate
    #[arg(long)]
    pub mpas: Option<PathBuf>,

    #[command(flatten)]
    pub mpas_vars: MpasVariables,
}

/// Log and return the statistics of every field found. Missing files are
/// skipped with a warning.
pub fn run(paths: &ProjectPaths, args: &InspectArgs) -> PrecipResult<Vec<(String, FieldStats)>> {
    let mut report = Vec::new();

    let gpm_path = paths.remapped_gpm(args.gpm_file.as_deref());
    if let Some(ds) = open_if_present(&gpm_path)? {
        let field = ds.read_field(VariableRole::RemappedPrecipitation)?;
        report.push((format!("GPM {}", field.name), field.stats()));
    }

    let smoothed_path = match &args.smoothed_file {
        Some(p) => paths.input(p),
        None => paths.data(SMOOTHED_FILE),
    };
    if let Some(ds) = open_if_present(&smoothed_path)? {
        for name in ds.variable_names() {
            if name.starts_with(SMOOTHED_PREFIX) {
                let field = ds.read_variable(&name)?;
                report.push((name, field.stats()));
            }
        }
    }

    if let Some(mpas) = &args.mpas {
        let rate = load_mpas_rate(&paths.input(mpas), RateUnit::MmPerDay, false, &args.mpas_vars)?;
        report.push(("MPAS (mm/day)".to_string(), rate.field.stats()));
    }

    for (label, stats) in &report {
        stats.log(label);
    }
    info!(fields = report.len(), "Inspection complete");
    Ok(report)
}

fn open_if_present(path: &Path) -> PrecipResult<Option<Dataset>> {
    if path.exists() {
        Dataset::open(path).map(Some)
    } else {
        warn!(path = %path.display(), "File not found; skipping");
        Ok(None)
    }
}
