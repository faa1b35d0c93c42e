//! Export fitted peaks to CSV.
//!
//! One row per fitted peak, with stable column names, so spreadsheets and
//! downstream scripts can take the file as-is.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{PeakRecord, ReportStyle};
use crate::error::AppError;

/// Write fitted peaks to a CSV file, one row per successfully fitted mode.
pub fn write_peaks_csv(path: &Path, records: &[PeakRecord], style: &ReportStyle) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create peaks CSV '{}': {e}", path.display())))?;

    // Header
    writeln!(
        file,
        "peak,unit,position,hwhm,width_fwhm,amplitude,offset,height,fitting_error,sse,iterations"
    )
    .map_err(|e| AppError::new(2, format!("Failed to write the peaks CSV header: {e}")))?;

    for r in records {
        writeln!(
            file,
            "{},{},{:.10},{:.10},{:.10},{:.10},{:.10},{:.10},{:.10},{:.10},{}",
            r.peak,
            style.unit,
            r.params.center,
            r.params.hwhm,
            r.width,
            r.params.amplitude,
            r.params.offset,
            r.height,
            r.error,
            r.sse,
            r.iterations,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write a peaks CSV row: {e}")))?;
    }

    Ok(())
}
