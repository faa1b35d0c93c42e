//! Concrete type definitions for the fitter's domain.
//!
//! Plain data, no behavior beyond small accessors. The serializable ones
//! travel through the JSON/CSV exports and come back in for `plot`, so the
//! same structs serve the live fit and the replay path.

use std::path::PathBuf;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Parameters of the Lorentzian lineshape.
///
/// The model evaluated at frequency `x` is
///
/// `amplitude / (π · hwhm · (1 + ((x − center)/hwhm)²)) + offset`
///
/// `hwhm` is the half width at half maximum of the underlying Cauchy profile;
/// the reported full width is `2 · hwhm`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakParams {
    /// Peak position (frequency units).
    pub center: f64,
    /// Half-width scale (frequency units).
    pub hwhm: f64,
    /// Integrated amplitude scale.
    pub amplitude: f64,
    /// Constant vertical offset (baseline).
    pub offset: f64,
}

impl PeakParams {
    pub fn new(center: f64, hwhm: f64, amplitude: f64, offset: f64) -> Self {
        Self {
            center,
            hwhm,
            amplitude,
            offset,
        }
    }

    /// Full width at half maximum: `2 · hwhm` (sign preserved).
    pub fn fwhm(&self) -> f64 {
        2.0 * self.hwhm
    }

    /// Parameter order used by the solver: `[center, hwhm, amplitude, offset]`.
    pub fn to_array(self) -> [f64; 4] {
        [self.center, self.hwhm, self.amplitude, self.offset]
    }

    pub fn from_array(p: [f64; 4]) -> Self {
        Self {
            center: p[0],
            hwhm: p[1],
            amplitude: p[2],
            offset: p[3],
        }
    }
}

/// A successful fit for one mode (one matrix column).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakFit {
    /// Column index in the spectrum matrix (0-based; reports print `mode + 1`).
    pub mode: usize,
    pub params: PeakParams,
    /// Scaled parameter covariance, same order as [`PeakParams::to_array`].
    pub covariance: [[f64; 4]; 4],
    /// Full width at half maximum, `2 · hwhm`.
    pub width: f64,
    /// Scalar fit uncertainty: `|mean of all covariance entries|`.
    pub error: f64,
    /// Largest observed intensity in the column (annotation anchor height).
    pub height: f64,
    pub sse: f64,
    pub iterations: usize,
}

/// A skipped mode and why its fit failed.
#[derive(Debug, Clone)]
pub struct SkippedMode {
    /// Column index (0-based).
    pub mode: usize,
    pub reason: String,
}

/// Output of fitting every column of a spectrum matrix.
#[derive(Debug, Clone, Default)]
pub struct SpectrumAnalysis {
    pub peaks: Vec<PeakFit>,
    pub skipped: Vec<SkippedMode>,
}

impl SpectrumAnalysis {
    pub fn total_modes(&self) -> usize {
        self.peaks.len() + self.skipped.len()
    }
}

/// Summary statistics for an ingested or synthesized dataset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DatasetStats {
    pub modes: usize,
    pub samples: usize,
    pub freq_min: f64,
    pub freq_max: f64,
    pub intensity_min: f64,
    pub intensity_max: f64,
}

/// A loaded (or generated) set of power spectra sharing one frequency axis.
///
/// Matrix layout: rows are frequency samples, columns are independent modes.
#[derive(Debug, Clone)]
pub struct SpectrumData {
    pub frequencies: Vec<f64>,
    pub matrix: DMatrix<f64>,
    /// Where the data came from, for report headers (path or sample seed).
    pub source: String,
}

impl SpectrumData {
    pub fn stats(&self) -> DatasetStats {
        let mut freq_min = f64::INFINITY;
        let mut freq_max = f64::NEG_INFINITY;
        for &f in &self.frequencies {
            freq_min = freq_min.min(f);
            freq_max = freq_max.max(f);
        }
        let mut intensity_min = f64::INFINITY;
        let mut intensity_max = f64::NEG_INFINITY;
        for &v in self.matrix.iter() {
            intensity_min = intensity_min.min(v);
            intensity_max = intensity_max.max(v);
        }
        DatasetStats {
            modes: self.matrix.ncols(),
            samples: self.matrix.nrows(),
            freq_min,
            freq_max,
            intensity_min,
            intensity_max,
        }
    }
}

/// Configuration for the synthetic sample generator.
#[derive(Debug, Clone, Copy)]
pub struct SampleConfig {
    pub modes: usize,
    pub samples: usize,
    pub seed: u64,
    pub freq_min: f64,
    pub freq_max: f64,
    /// Noise standard deviation as a fraction of each mode's peak height.
    pub noise: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            modes: 4,
            samples: 400,
            seed: 7,
            freq_min: 0.0,
            freq_max: 10.0,
            noise: 0.02,
        }
    }
}

/// Formatting rules for reports and figure annotations.
///
/// Defaults mirror the conventional phonon-spectra output: frequencies in THz,
/// 6 decimals in report lines, annotation width right-aligned to 10 columns
/// at 4 decimals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportStyle {
    /// Unit label appended to width and position lines.
    pub unit: String,
    /// Decimal places in report lines.
    pub decimals: usize,
    /// Decimal places in the in-figure width annotation.
    pub annotation_decimals: usize,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            unit: "THz".to_string(),
            decimals: 6,
            annotation_decimals: 4,
        }
    }
}

impl ReportStyle {
    /// X-axis label for figures, e.g. `Frequency [THz]`.
    pub fn frequency_label(&self) -> String {
        format!("Frequency [{}]", self.unit)
    }
}

/// Everything one fitting run needs, assembled from CLI flags plus defaults.
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Input CSV; when `None` a synthetic dataset is generated instead.
    pub spectra_path: Option<PathBuf>,
    pub sample: SampleConfig,

    /// Initial half-width guess handed to the solver.
    pub hwhm_guess: f64,
    /// Initial baseline guess handed to the solver.
    pub offset_guess: f64,
    /// Iteration cap for one column's fit.
    pub max_iterations: usize,

    pub ascii: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub png_dir: Option<PathBuf>,
    pub png_width: u32,
    pub png_height: u32,

    pub export_csv: Option<PathBuf>,
    pub export_results: Option<PathBuf>,

    pub style: ReportStyle,
}

/// One peak as persisted in a results file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakRecord {
    /// 1-based peak number as printed in reports.
    pub peak: usize,
    pub params: PeakParams,
    pub width: f64,
    pub error: f64,
    pub height: f64,
    pub sse: f64,
    pub iterations: usize,
    pub covariance: [[f64; 4]; 4],
    /// Fitted lineshape evaluated over the full frequency axis.
    pub curve: Vec<f64>,
}

impl PeakRecord {
    pub fn from_fit(fit: &PeakFit, curve: Vec<f64>) -> Self {
        Self {
            peak: fit.mode + 1,
            params: fit.params,
            width: fit.width,
            error: fit.error,
            height: fit.height,
            sse: fit.sse,
            iterations: fit.iterations,
            covariance: fit.covariance,
            curve,
        }
    }
}

/// A saved results file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsFile {
    pub tool: String,
    /// RFC 3339 local timestamp of the run.
    pub generated: String,
    pub unit: String,
    pub frequencies: Vec<f64>,
    pub peaks: Vec<PeakRecord>,
}
