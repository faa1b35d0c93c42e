//! CSV ingest and validation.
//!
//! Turns a spectra CSV into a clean frequency axis plus intensity matrix
//! that is safe to fit.
//!
//! Expected schema: a `frequency` column first, then one column per phonon
//! mode. Each data row is one frequency sample.
//!
//! The header row is validated strictly (clear message, exit code 2). Data
//! rows are validated one at a time: a bad line is skipped and reported, not
//! fatal. No fitting logic lives here.

use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use nalgebra::DMatrix;

use crate::domain::SpectrumData;
use crate::error::AppError;

/// One rejected CSV row, with its 1-based line number.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed spectra plus a record of everything the loader skipped.
#[derive(Debug, Clone)]
pub struct IngestedSpectra {
    pub data: SpectrumData,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a spectra CSV into a frequency axis and intensity matrix.
pub fn load_spectra(path: &Path) -> Result<IngestedSpectra, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open spectra CSV '{}': {e}", path.display()),
        )
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read the CSV header row: {e}")))?
        .clone();

    let n_modes = ensure_schema(&headers)?;

    let mut frequencies = Vec::new();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // The header sits on line 1 and records() starts right after it, so
        // record idx 0 is CSV line 2.
        let line = idx + 2;
        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, n_modes));
        match parsed {
            Ok((frequency, intensities)) => {
                frequencies.push(frequency);
                rows.push(intensities);
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = rows.len();
    let rows_read = rows_used + row_errors.len();
    if rows_used == 0 {
        return Err(AppError::new(3, "No valid rows remain after validation."));
    }

    let matrix = DMatrix::from_row_iterator(rows_used, n_modes, rows.into_iter().flatten());

    Ok(IngestedSpectra {
        data: SpectrumData {
            frequencies,
            matrix,
            source: path.display().to_string(),
        },
        row_errors,
        rows_read,
        rows_used,
    })
}

/// Validate the header row; returns the number of mode columns.
fn ensure_schema(headers: &StringRecord) -> Result<usize, AppError> {
    let Some(first) = headers.get(0) else {
        return Err(AppError::new(2, "Empty CSV header row."));
    };
    let first = normalize_header_name(first);
    if first != "frequency" {
        return Err(AppError::new(
            2,
            format!("First column must be `frequency`, found `{first}`."),
        ));
    }

    let n_modes = headers.len() - 1;
    if n_modes == 0 {
        return Err(AppError::new(2, "No mode columns found after `frequency`."));
    }
    Ok(n_modes)
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often glue a UTF-8 BOM onto the first header name
    // ("\u{feff}frequency"); unless it is stripped, the schema check cannot
    // find the frequency column.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, n_modes: usize) -> Result<(f64, Vec<f64>), String> {
    if record.len() != n_modes + 1 {
        return Err(format!(
            "Expected {} fields, found {}.",
            n_modes + 1,
            record.len()
        ));
    }

    let frequency = parse_finite(record.get(0).unwrap_or(""), "frequency")?;
    let intensities = record
        .iter()
        .skip(1)
        .map(|field| parse_finite(field, "intensity"))
        .collect::<Result<Vec<f64>, String>>()?;

    Ok((frequency, intensities))
}

fn parse_finite(field: &str, what: &str) -> Result<f64, String> {
    let text = field.trim();
    if text.is_empty() {
        return Err(format!("Missing {what} value."));
    }
    let v: f64 = text
        .parse()
        .map_err(|_| format!("Invalid {what} value '{text}'."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite {what} value '{text}'."));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_accepts_bom_and_mixed_case() {
        let headers = StringRecord::from(vec!["\u{feff}Frequency", "mode_1", "mode_2"]);
        assert_eq!(ensure_schema(&headers).unwrap(), 2);
    }

    #[test]
    fn schema_rejects_wrong_first_column() {
        let headers = StringRecord::from(vec!["wavenumber", "mode_1"]);
        let err = ensure_schema(&headers).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn schema_requires_at_least_one_mode_column() {
        let headers = StringRecord::from(vec!["frequency"]);
        let err = ensure_schema(&headers).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn row_parses_frequency_and_intensities() {
        let record = StringRecord::from(vec!["1.5", "0.25", "0.5"]);
        let (freq, values) = parse_row(&record, 2).unwrap();
        assert_eq!(freq, 1.5);
        assert_eq!(values, vec![0.25, 0.5]);
    }

    #[test]
    fn row_rejects_wrong_field_count_and_bad_values() {
        let short = StringRecord::from(vec!["1.5", "0.25"]);
        assert!(parse_row(&short, 2).is_err());

        let non_numeric = StringRecord::from(vec!["1.5", "x", "0.5"]);
        assert!(parse_row(&non_numeric, 2).is_err());

        let non_finite = StringRecord::from(vec!["1.5", "NaN", "0.5"]);
        assert!(parse_row(&non_finite, 2).is_err());
    }
}
