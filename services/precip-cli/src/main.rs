//! GPM versus MPAS precipitation comparison pipeline.
//!
//! Regrids satellite precipitation onto the model grid, smooths it, draws
//! comparison maps and compares radial power spectra.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use precip_cli::commands::Command;
use precip_cli::{PipelineOptions, ProjectPaths};
use precip_common::PrecipError;

#[derive(Parser, Debug)]
#[command(name = "precip-cli")]
#[command(about = "Regrid, smooth and spectrally compare GPM and MPAS precipitation")]
struct Cli {
    /// Project root holding data_processed/ and figs/
    #[arg(long, global = true, env = "PRECIP_ROOT")]
    root: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Treat precipitation without a units attribute as mm/h
    #[arg(long, global = true)]
    assume_missing_units_mm_per_hour: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    if let Err(e) = run(&cli) {
        let chain = format!("{:#}", e);
        let code = e
            .downcast_ref::<PrecipError>()
            .map(PrecipError::error_code)
            .unwrap_or("Error");
        error!(error = %chain, code, command = cli.command.name(), "Command failed");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let paths = ProjectPaths::resolve(cli.root.as_deref()).context("resolving project paths")?;
    let options = PipelineOptions::from_flag(cli.assume_missing_units_mm_per_hour);
    info!(
        command = cli.command.name(),
        root = %paths.root.display(),
        missing_unit = ?options.missing_unit,
        "Starting"
    );

    let written = cli
        .command
        .execute(&paths, &options)
        .with_context(|| format!("{} failed", cli.command.name()))?;
    for path in &written {
        info!(path = %path.display(), "Wrote");
    }
    Ok(())
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt().with_env_filter(filter).with_target(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
