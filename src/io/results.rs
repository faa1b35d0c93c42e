//! Read/write results JSON files.
//!
//! Results JSON is the portable representation of one fitting run:
//! - fitted parameters per peak (plus covariance and quality numbers)
//! - the shared frequency axis
//! - precomputed fitted curves for quick replotting
//!
//! The schema is defined by `domain::ResultsFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{PeakRecord, ReportStyle, ResultsFile, SpectrumAnalysis};
use crate::error::AppError;
use crate::models::lorentzian_curve;

/// Build the persisted records for an analysis, one per fitted peak.
pub fn build_peak_records(analysis: &SpectrumAnalysis, frequencies: &[f64]) -> Vec<PeakRecord> {
    analysis
        .peaks
        .iter()
        .map(|fit| PeakRecord::from_fit(fit, lorentzian_curve(frequencies, &fit.params)))
        .collect()
}

/// Write a results JSON file.
pub fn write_results_json(
    path: &Path,
    records: &[PeakRecord],
    frequencies: &[f64],
    style: &ReportStyle,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create results JSON '{}': {e}", path.display())))?;

    let results = ResultsFile {
        tool: "phonofit".to_string(),
        generated: chrono::Local::now().to_rfc3339(),
        unit: style.unit.clone(),
        frequencies: frequencies.to_vec(),
        peaks: records.to_vec(),
    };

    serde_json::to_writer_pretty(file, &results)
        .map_err(|e| AppError::new(2, format!("Failed to write results JSON: {e}")))?;

    Ok(())
}

/// Read a results JSON file.
pub fn read_results_json(path: &Path) -> Result<ResultsFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open results JSON '{}': {e}", path.display())))?;
    let results: ResultsFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid results JSON: {e}")))?;
    Ok(results)
}
