//! The fit workflow behind both `fit` and `view`.
//!
//! One function owns the whole sequence from loading (or generating)
//! spectra through fitting every mode to building the diagnostic figures.
//! Frontends only differ in how they present the resulting `RunOutput`.

use crate::domain::{DatasetStats, FitConfig, SpectrumAnalysis, SpectrumData};
use crate::error::AppError;
use crate::fit::FitOptions;
use crate::plot::PeakFigure;

/// All computed outputs of a single fitting run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub data: SpectrumData,
    pub stats: DatasetStats,
    pub analysis: SpectrumAnalysis,
    /// One diagnostic figure per successful fit, in mode order.
    pub figures: Vec<PeakFigure>,
}

/// Run the whole sequence and collect every output a frontend could need.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let data = match &config.spectra_path {
        Some(path) => {
            let ingest = crate::io::ingest::load_spectra(path)?;
            for err in &ingest.row_errors {
                log::warn!("{} line {}: {}", path.display(), err.line, err.message);
            }
            log::info!(
                "Loaded {} of {} rows from {}",
                ingest.rows_used,
                ingest.rows_read,
                path.display()
            );
            ingest.data
        }
        None => crate::data::generate_spectra(&config.sample)?.data,
    };

    run_fit_with_data(config, data)
}

/// Execute the fitting pipeline on pre-loaded spectra.
///
/// This is useful for callers that already hold the data in memory and only
/// want the fit + figures.
pub fn run_fit_with_data(config: &FitConfig, data: SpectrumData) -> Result<RunOutput, AppError> {
    let opts = FitOptions {
        hwhm_guess: config.hwhm_guess,
        offset_guess: config.offset_guess,
        max_iterations: config.max_iterations,
    };

    let analysis = crate::fit::fit_all(&data.frequencies, &data.matrix, &opts)?;
    let figures = crate::plot::build_figures(&data, &analysis.peaks, &config.style);
    let stats = data.stats();

    Ok(RunOutput {
        data,
        stats,
        analysis,
        figures,
    })
}
