//! Subcommands of the `precip-cli` binary.
//!
//! Each stage reads its inputs from disk, writes its outputs under the
//! project directories and returns the paths it produced.

pub mod compare;
pub mod inspect;
pub mod plot_map;
pub mod regrid;
pub mod run_all;
pub mod smooth;
pub mod spectral;

use clap::Subcommand;
use precip_common::PrecipResult;

use crate::config::{PipelineOptions, ProjectPaths};

pub use compare::CompareArgs;
pub use inspect::InspectArgs;
pub use plot_map::PlotMapArgs;
pub use regrid::RegridArgs;
pub use run_all::RunAllArgs;
pub use smooth::SmoothArgs;
pub use self::spectral::{SpectralArgs, SpectralMode};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize GPM and remap it onto the MPAS grid
    Regrid(RegridArgs),
    /// Moving-mean and Gaussian smoothing of the remapped GPM
    Smooth(SmoothArgs),
    /// Side-by-side GPM and MPAS precipitation maps
    Compare(CompareArgs),
    /// Radial power spectra and spectral efficiency
    Spectral(SpectralArgs),
    /// Map of one time step of a processed variable
    PlotMap(PlotMapArgs),
    /// Log summary statistics of the processed files
    Inspect(InspectArgs),
    /// regrid, smooth, compare and spectral in sequence
    RunAll(RunAllArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Regrid(_) => "regrid",
            Command::Smooth(_) => "smooth",
            Command::Compare(_) => "compare",
            Command::Spectral(_) => "spectral",
            Command::PlotMap(_) => "plot-map",
            Command::Inspect(_) => "inspect",
            Command::RunAll(_) => "run-all",
        }
    }

    /// Run the subcommand and return the files it wrote.
    pub fn execute(
        &self,
        paths: &ProjectPaths,
        options: &PipelineOptions,
    ) -> PrecipResult<Vec<std::path::PathBuf>> {
        match self {
            Command::Regrid(args) => regrid::run(paths, options, args).map(|p| vec![p]),
            Command::Smooth(args) => smooth::run(paths, args).map(|p| vec![p]),
            Command::Compare(args) => compare::run(paths, options, args).map(|p| vec![p]),
            Command::Spectral(args) => spectral::run(paths, options, args),
            Command::PlotMap(args) => plot_map::run(paths, args).map(|p| vec![p]),
            Command::Inspect(args) => inspect::run(paths, args).map(|_| Vec::new()),
            Command::RunAll(args) => run_all::run(paths, options, args),
        }
    }
}
