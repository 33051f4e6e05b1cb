//! `spectral`: radial power spectra and spectral efficiency of GPM against MPAS.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use grid_processor::{smooth_field, trim_edges};
use precip_common::{Field, PrecipResult, RateUnit};
use renderer::{spectral_figure, spectrum_heatmap, AxisScale, FigureStyle, LineChart, Series};
use serde::Serialize;
use spectral::{
    compute_spectrum, radial_mean, spectral_efficiency, standardize, CenterConvention,
    PowerSpectrum2D, RadialProfile, SpectrumNormalization,
};
use tracing::{debug, info};

use crate::config::{
    PipelineOptions, ProjectPaths, EFFICIENCY_FIGURE, EFFICIENCY_FILE, RADIAL_SPECTRA_FILE,
};
use crate::loaders::{load_mpas_rate, load_remapped_gpm, MpasVariables};

const CHART_WIDTH: usize = 640;
const CHART_HEIGHT: usize = 480;
const LOG_FLOOR: f64 = 1e-12;
/// Boundary cells dropped by a standalone `spectral` run.
pub const DEFAULT_TRIM: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SpectralMode {
    /// Radial power spectra of GPM and MPAS
    Power,
    /// GPM (original and smoothed) over MPAS power ratios
    Efficiency,
    /// Both
    All,
}

#[derive(Debug, Clone, Args)]
pub struct SpectralArgs {
    #[arg(value_enum)]
    pub mode: SpectralMode,

    /// MPAS NetCDF file with rainc/rainnc accumulators
    #[arg(long)]
    pub mpas: PathBuf,

    /// Remapped GPM file (defaults to the time mean, else the time series)
    #[arg(long)]
    pub gpm_file: Option<PathBuf>,

    /// Rate unit both fields are converted to before the FFT
    #[arg(long, default_value = "mm/day")]
    pub unit: RateUnit,

    /// Standardize each field to zero mean and unit variance
    #[arg(long)]
    pub normalize: bool,

    /// Cells removed from every edge before the FFT
    #[arg(long, default_value_t = DEFAULT_TRIM)]
    pub trim: usize,

    /// Gaussian sigma for the smoothed GPM curves
    #[arg(long, default_value_t = 1.0)]
    pub sigma: f32,

    /// Radial bin center (integer-floor or midpoint)
    #[arg(long, default_value = "integer-floor")]
    pub center: CenterConvention,

    /// Spectrum scaling (raw or per-cell)
    #[arg(long, default_value = "raw")]
    pub spectrum_norm: SpectrumNormalization,

    /// Add the 2D log-power panels to the power figure
    #[arg(long)]
    pub show_2d: bool,

    /// Figure style (black or light)
    #[arg(long, default_value = "black")]
    pub style: FigureStyle,

    /// Power figure file name, relative to figs/
    #[arg(long)]
    pub outfile: Option<PathBuf>,

    /// Worker threads for smoothing (0 = one per core)
    #[arg(long, default_value_t = 0)]
    pub jobs: usize,

    #[command(flatten)]
    pub mpas_vars: MpasVariables,
}

/// One labelled radial profile as written to JSON.
#[derive(Debug, Serialize)]
struct NamedProfile<'a> {
    label: &'a str,
    values: &'a [f64],
    counts: &'a [usize],
}

#[derive(Debug, Serialize)]
struct RadialSpectraReport<'a> {
    unit: &'static str,
    center: CenterConvention,
    normalization: &'static str,
    standardized: bool,
    trim: usize,
    profiles: Vec<NamedProfile<'a>>,
}

#[derive(Debug, Serialize)]
struct EfficiencyCurve<'a> {
    label: &'a str,
    values: &'a [f64],
}

#[derive(Debug, Serialize)]
struct EfficiencyReport<'a> {
    unit: &'static str,
    center: CenterConvention,
    sigma: f32,
    reference: &'static str,
    curves: Vec<EfficiencyCurve<'a>>,
}

/// A field's spectrum and its radial profile.
struct Analysed {
    label: String,
    spectrum: PowerSpectrum2D,
    profile: RadialProfile,
}

pub fn run(
    paths: &ProjectPaths,
    options: &PipelineOptions,
    args: &SpectralArgs,
) -> PrecipResult<Vec<PathBuf>> {
    let gpm = load_remapped_gpm(
        &paths.remapped_gpm(args.gpm_file.as_deref()),
        args.unit,
        options.missing_unit,
    )?
    .field;
    let mpas = load_mpas_rate(&paths.input(&args.mpas), args.unit, true, &args.mpas_vars)?.field;

    let mut written = Vec::new();
    if matches!(args.mode, SpectralMode::Power | SpectralMode::All) {
        written.extend(power(paths, args, &gpm, &mpas)?);
    }
    if matches!(args.mode, SpectralMode::Efficiency | SpectralMode::All) {
        written.extend(efficiency(paths, args, &gpm, &mpas)?);
    }
    Ok(written)
}

fn power(
    paths: &ProjectPaths,
    args: &SpectralArgs,
    gpm: &Field,
    mpas: &Field,
) -> PrecipResult<Vec<PathBuf>> {
    let analysed = [analyse("GPM", gpm, args)?, analyse("MPAS", mpas, args)?];

    let mut chart = LineChart::new(CHART_WIDTH, CHART_HEIGHT, args.style)
        .with_scales(AxisScale::Linear, AxisScale::Log10);
    for a in &analysed {
        let values = a.profile.values.iter().map(|v| v + LOG_FLOOR).collect();
        chart.add_series(Series::new(a.label.as_str(), values));
    }

    let heatmaps = if args.show_2d {
        analysed
            .iter()
            .map(|a| {
                let (ny, nx) = a.spectrum.shape();
                spectrum_heatmap(&a.spectrum.log10(), ny, nx, args.style)
            })
            .collect::<PrecipResult<Vec<_>>>()?
    } else {
        Vec::new()
    };

    let figure_name = args
        .outfile
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("espectros_precipitacao_{}.png", args.style)));
    let figure_path = paths.figure(&figure_name);
    spectral_figure(heatmaps, &chart, args.style)?.save_png(&figure_path)?;

    let report = RadialSpectraReport {
        unit: args.unit.as_str(),
        center: args.center,
        normalization: args.spectrum_norm.as_str(),
        standardized: args.normalize,
        trim: args.trim,
        profiles: analysed
            .iter()
            .map(|a| NamedProfile {
                label: &a.label,
                values: &a.profile.values,
                counts: &a.profile.counts,
            })
            .collect(),
    };
    let json_path = paths.data(RADIAL_SPECTRA_FILE);
    write_json(&json_path, &report)?;

    info!(
        figure = %figure_path.display(),
        profiles = %json_path.display(),
        bins = analysed[0].profile.len(),
        "Power spectra written"
    );
    Ok(vec![figure_path, json_path])
}

fn efficiency(
    paths: &ProjectPaths,
    args: &SpectralArgs,
    gpm: &Field,
    mpas: &Field,
) -> PrecipResult<Vec<PathBuf>> {
    let smoothed = smooth_field(gpm, args.sigma, args.jobs)?;
    let reference = analyse("MPAS", mpas, args)?;

    let numerators = [
        analyse("GPM (original)", gpm, args)?,
        analyse("GPM (3x3 moving mean)", &smoothed.moving_mean, args)?,
        analyse(
            &format!("GPM (gaussian sigma={})", args.sigma),
            &smoothed.gaussian,
            args,
        )?,
    ];
    let ratios = numerators
        .iter()
        .map(|a| spectral_efficiency(&a.profile.values, &reference.profile.values))
        .collect::<PrecipResult<Vec<_>>>()?;

    let mut chart = LineChart::new(CHART_WIDTH, CHART_HEIGHT, args.style)
        .with_scales(AxisScale::Log10, AxisScale::Log10);
    for (a, ratio) in numerators.iter().zip(&ratios) {
        chart.add_series(Series::new(a.label.as_str(), ratio.clone()));
    }
    let figure_path = paths.figure(Path::new(EFFICIENCY_FIGURE));
    chart.render()?.save_png(&figure_path)?;

    let report = EfficiencyReport {
        unit: args.unit.as_str(),
        center: args.center,
        sigma: args.sigma,
        reference: "MPAS",
        curves: numerators
            .iter()
            .zip(&ratios)
            .map(|(a, ratio)| EfficiencyCurve {
                label: &a.label,
                values: ratio,
            })
            .collect(),
    };
    let json_path = paths.data(EFFICIENCY_FILE);
    write_json(&json_path, &report)?;

    info!(
        figure = %figure_path.display(),
        ratios = %json_path.display(),
        "Spectral efficiency written"
    );
    Ok(vec![figure_path, json_path])
}

/// Standardize (optionally), trim, then reduce to a radial profile.
fn analyse(label: &str, field: &Field, args: &SpectralArgs) -> PrecipResult<Analysed> {
    let field = if args.normalize {
        standardize(field)
    } else {
        field.clone()
    };
    let field = trim_edges(&field, args.trim)?;
    field.stats().log(label);

    let spectrum = compute_spectrum(&field, args.spectrum_norm)?;
    let profile = radial_mean(&spectrum, args.center);
    debug!(
        label,
        shape = ?spectrum.shape(),
        total_power = spectrum.total(),
        bins = profile.len(),
        "Radial profile"
    );
    Ok(Analysed {
        label: label.to_string(),
        spectrum,
        profile,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> PrecipResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
