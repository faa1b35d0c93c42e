//! Command-line surface for the Lorentzian peak fitter.
//!
//! Only flag definitions live here; dispatch sits in `app` and the math
//! never sees clap types.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// `phonofit` command line.
#[derive(Debug, Parser)]
#[command(name = "phonofit", version, about = "Lorentzian peak fitter for phonon power spectra")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit every mode of a spectra CSV (or a synthetic set), print peak reports, and optionally plot/export.
    Fit(FitArgs),
    /// Fit and browse the fitted peaks in an interactive TUI.
    ///
    /// This uses the same underlying fit pipeline as `phonofit fit`, but renders
    /// the figures in a terminal UI using Ratatui.
    View(FitArgs),
    /// Plot a previously exported results JSON.
    Plot(PlotArgs),
}

/// Common options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Spectra CSV: a `frequency` column plus one column per mode. When omitted,
    /// a synthetic dataset is generated instead.
    #[arg(short = 's', long, value_name = "CSV")]
    pub spectra: Option<PathBuf>,

    /// Number of synthetic modes to generate.
    #[arg(short = 'm', long, default_value_t = 4)]
    pub modes: usize,

    /// Number of frequency samples in the synthetic axis.
    #[arg(short = 'n', long, default_value_t = 400)]
    pub samples: usize,

    /// Random seed for sample generation.
    #[arg(long, default_value_t = 7)]
    pub seed: u64,

    /// Lower edge of the synthetic frequency axis.
    #[arg(long, default_value_t = 0.0)]
    pub freq_min: f64,

    /// Upper edge of the synthetic frequency axis.
    #[arg(long, default_value_t = 10.0)]
    pub freq_max: f64,

    /// Synthetic noise standard deviation as a fraction of each mode's peak height.
    #[arg(long, default_value_t = 0.02)]
    pub noise: f64,

    /// Initial half-width (HWHM) guess handed to the solver.
    #[arg(long, default_value_t = 0.1)]
    pub hwhm_guess: f64,

    /// Initial baseline guess handed to the solver.
    #[arg(long, default_value_t = 0.0)]
    pub offset_guess: f64,

    /// Iteration cap for one mode's fit.
    #[arg(long, default_value_t = 100)]
    pub max_iterations: usize,

    /// Unit label for report lines and axis labels.
    #[arg(long, default_value = "THz")]
    pub unit: String,

    /// Decimal places in report lines.
    #[arg(long, default_value_t = 6)]
    pub decimals: usize,

    /// Render ASCII figures in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal figures.
    #[arg(long)]
    pub no_plot: bool,

    /// ASCII chart width in columns.
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII chart height in rows.
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write one PNG figure per fitted peak into this directory.
    #[arg(long, value_name = "DIR")]
    pub png_dir: Option<PathBuf>,

    /// PNG width (pixels).
    #[arg(long, default_value_t = 1024)]
    pub png_width: u32,

    /// PNG height (pixels).
    #[arg(long, default_value_t = 768)]
    pub png_height: u32,

    /// Export fitted peaks to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export results (parameters + fitted curves) to JSON.
    #[arg(long = "export-results", value_name = "JSON")]
    pub export_results: Option<PathBuf>,
}

/// Options for plotting saved results.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Results JSON file produced by `phonofit fit --export-results`.
    #[arg(long, value_name = "JSON")]
    pub results: PathBuf,

    /// ASCII chart width in columns.
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII chart height in rows.
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write PNG figures into this directory instead of printing ASCII charts.
    #[arg(long, value_name = "DIR")]
    pub png_dir: Option<PathBuf>,

    /// PNG width (pixels).
    #[arg(long, default_value_t = 1024)]
    pub png_width: u32,

    /// PNG height (pixels).
    #[arg(long, default_value_t = 768)]
    pub png_height: u32,
}
