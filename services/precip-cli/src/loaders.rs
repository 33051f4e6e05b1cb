//! Loading GPM and MPAS precipitation as rates on a common unit base.

use std::path::Path;

use clap::Args;
use grid_processor::{accumulation_to_rate, sum_accumulators, AccumulationOptions, UnitNormalizer};
use netcdf_io::Dataset;
use precip_common::{Field, GridCoords, MissingUnitPolicy, PrecipResult, RateUnit, TimeAxis, VariableRole};
use tracing::info;

/// A rate field with the grid it lives on.
#[derive(Debug, Clone)]
pub struct LoadedRate {
    pub field: Field,
    pub coords: GridCoords,
    /// Present for time series; `None` after a time mean.
    pub times: Option<TimeAxis>,
}

impl LoadedRate {
    fn finish(mut self, time_mean: bool) -> PrecipResult<Self> {
        if time_mean && self.field.rank() == 3 {
            self.field = self.field.time_mean()?;
            self.times = None;
        }
        Ok(self)
    }
}

/// Raw GPM/IMERG precipitation converted to `unit`.
pub fn load_gpm_rate(
    path: &Path,
    unit: RateUnit,
    time_mean: bool,
    missing_unit: MissingUnitPolicy,
) -> PrecipResult<LoadedRate> {
    let ds = Dataset::open(path)?;
    let raw = ds.read_field(VariableRole::Precipitation)?;
    let field = UnitNormalizer::new(unit)
        .with_missing_unit_policy(missing_unit)
        .normalize(&raw)?;
    let coords = ds.read_coords()?;
    let times = read_times_for(&ds, &field)?;

    info!(
        path = %path.display(),
        variable = %raw.name,
        shape = ?field.dims(),
        unit = %unit,
        "Loaded GPM rate"
    );
    LoadedRate {
        field,
        coords,
        times,
    }
    .finish(time_mean)
}

/// Explicit names for the MPAS accumulators, overriding the alias table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct MpasVariables {
    /// Convective accumulated precipitation variable
    #[arg(long)]
    pub rainc_name: Option<String>,

    /// Grid-scale accumulated precipitation variable
    #[arg(long)]
    pub rainnc_name: Option<String>,
}

/// MPAS `rainc + rainnc` accumulators differenced into a rate in `unit`.
///
/// The rate series has one step fewer than the file, each labelled by the
/// end of its interval.
pub fn load_mpas_rate(
    path: &Path,
    unit: RateUnit,
    time_mean: bool,
    variables: &MpasVariables,
) -> PrecipResult<LoadedRate> {
    let ds = Dataset::open(path)?;
    let rainc = ds.read_field_named(
        VariableRole::ConvectiveAccumulation,
        variables.rainc_name.as_deref(),
    )?;
    let rainnc = ds.read_field_named(
        VariableRole::GridScaleAccumulation,
        variables.rainnc_name.as_deref(),
    )?;
    let total = sum_accumulators(&rainc, &rainnc)?;
    let times = ds.read_time_axis()?;

    let options = AccumulationOptions {
        target: unit,
        ..AccumulationOptions::default()
    };
    let field = accumulation_to_rate(&total, &times, &options)?
        .with_long_name(format!("MPAS precipitation rate ({})", unit));
    let coords = ds.read_coords()?;

    info!(
        path = %path.display(),
        rainc = %rainc.name,
        rainnc = %rainnc.name,
        shape = ?field.dims(),
        unit = %unit,
        "Loaded MPAS rate"
    );
    LoadedRate {
        field,
        coords,
        times: Some(times.interval_ends()),
    }
    .finish(time_mean)
}

/// GPM already remapped onto the MPAS grid, as a time-mean 2D field in `unit`.
pub fn load_remapped_gpm(
    path: &Path,
    unit: RateUnit,
    missing_unit: MissingUnitPolicy,
) -> PrecipResult<LoadedRate> {
    let ds = Dataset::open(path)?;
    let raw = ds.read_field(VariableRole::RemappedPrecipitation)?;
    let field = UnitNormalizer::new(unit)
        .with_missing_unit_policy(missing_unit)
        .normalize(&raw.time_mean()?)?;
    let coords = ds.read_coords()?;

    info!(
        path = %path.display(),
        variable = %raw.name,
        shape = ?field.dims(),
        unit = %unit,
        "Loaded remapped GPM"
    );
    Ok(LoadedRate {
        field,
        coords,
        times: None,
    })
}

/// The file's time axis when `field` is a time series.
pub fn read_times_for(ds: &Dataset, field: &Field) -> PrecipResult<Option<TimeAxis>> {
    if field.rank() == 3 && ds.has_time_axis() {
        Ok(Some(ds.read_time_axis()?))
    } else {
        Ok(None)
    }
}

/// Whether grid row 0 is the southernmost row.
pub fn rows_ascend_north(coords: &GridCoords) -> bool {
    let (ny, _) = coords.shape();
    if ny < 2 {
        return true;
    }
    coords.point(0, 0).0 <= coords.point(ny - 1, 0).0
}
