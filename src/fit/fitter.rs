//! Per-mode Lorentzian peak fitting.
//!
//! Given:
//! - a frequency axis `x_i`
//! - a spectrum matrix (one power spectrum per column)
//!
//! we fit, for each column independently:
//! - the four Lorentzian parameters minimizing the squared residual sum
//! - a scalar uncertainty derived from the parameter covariance
//!
//! A column whose fit fails numerically is skipped with a warning; one bad
//! mode never aborts the batch.

use nalgebra::{DMatrix, DVector};

use crate::domain::{PeakFit, PeakParams, SkippedMode, SpectrumAnalysis};
use crate::error::{AppError, FitFailure};
use crate::math::{levmar, LevMarOptions};
use crate::models::{lorentzian, lorentzian_jacobian_row};

/// Fitting options that affect how each mode is calibrated.
#[derive(Debug, Clone, Copy)]
pub struct FitOptions {
    /// Initial half-width guess (frequency units). The observed spectra are
    /// much wider than one frequency step, so a small fixed guess converges
    /// from below for typical phonon linewidths.
    pub hwhm_guess: f64,
    /// Initial baseline guess.
    pub offset_guess: f64,
    /// Iteration cap for one column's solver run.
    pub max_iterations: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            hwhm_guess: 0.1,
            offset_guess: 0.0,
            max_iterations: 100,
        }
    }
}

/// Reduce a parameter covariance matrix to a single scalar:
/// the absolute value of the arithmetic mean of all entries.
///
/// This is the conventional summary for these reports. It is crude (it mixes
/// variances and covariances of different units) but downstream consumers
/// expect exactly this number, so keep it bit-for-bit.
pub fn covariance_error(covariance: &DMatrix<f64>) -> f64 {
    covariance.mean().abs()
}

/// Initial parameter guess for one column, or `None` if the column is empty.
///
/// - center: frequency at the column's maximum (first occurrence on ties)
/// - hwhm / offset: fixed starting constants from [`FitOptions`]
/// - amplitude: the column's maximum value
pub fn initial_guess(frequencies: &[f64], column: &[f64], opts: &FitOptions) -> Option<PeakParams> {
    if column.is_empty() || frequencies.len() != column.len() {
        return None;
    }
    let mut best_idx = 0;
    let mut best = column[0];
    for (i, &v) in column.iter().enumerate().skip(1) {
        if v > best {
            best = v;
            best_idx = i;
        }
    }
    Some(PeakParams::new(
        frequencies[best_idx],
        opts.hwhm_guess,
        best,
        opts.offset_guess,
    ))
}

/// Fit one column of the spectrum matrix.
///
/// `mode` is the 0-based column index carried into the result for reporting.
/// Every numerical problem (non-finite data, no convergence, unidentified
/// parameters) comes back as [`FitFailure`] so the caller can skip the mode.
pub fn fit_column(
    frequencies: &[f64],
    column: &[f64],
    mode: usize,
    opts: &FitOptions,
) -> Result<PeakFit, FitFailure> {
    if frequencies.len() != column.len() {
        return Err(FitFailure::new(format!(
            "column has {} samples but the frequency axis has {}",
            column.len(),
            frequencies.len()
        )));
    }
    if frequencies.iter().any(|v| !v.is_finite()) {
        return Err(FitFailure::new("frequency axis contains non-finite values"));
    }
    if column.iter().any(|v| !v.is_finite()) {
        return Err(FitFailure::new("spectrum contains non-finite values"));
    }

    let guess = initial_guess(frequencies, column, opts)
        .ok_or_else(|| FitFailure::new("empty column"))?;
    let height = guess.amplitude;

    let n = frequencies.len();
    let residuals = |p: &DVector<f64>| {
        let params = PeakParams::from_array([p[0], p[1], p[2], p[3]]);
        Some(DVector::from_iterator(
            n,
            frequencies
                .iter()
                .zip(column)
                .map(|(&x, &y)| y - lorentzian(x, &params)),
        ))
    };
    let jacobian = |p: &DVector<f64>| {
        let params = PeakParams::from_array([p[0], p[1], p[2], p[3]]);
        let mut jac = DMatrix::zeros(n, 4);
        for (i, &x) in frequencies.iter().enumerate() {
            let row = lorentzian_jacobian_row(x, &params);
            for (j, &value) in row.iter().enumerate() {
                jac[(i, j)] = value;
            }
        }
        Some(jac)
    };

    let solver_opts = LevMarOptions {
        max_iterations: opts.max_iterations,
        ..LevMarOptions::default()
    };
    let fit = levmar(
        DVector::from_row_slice(&guess.to_array()),
        residuals,
        jacobian,
        &solver_opts,
    )?;

    let params = PeakParams::from_array([fit.params[0], fit.params[1], fit.params[2], fit.params[3]]);
    let error = covariance_error(&fit.covariance);
    let mut covariance = [[0.0; 4]; 4];
    for r in 0..4 {
        for c in 0..4 {
            covariance[r][c] = fit.covariance[(r, c)];
        }
    }

    Ok(PeakFit {
        mode,
        params,
        covariance,
        width: params.fwhm(),
        error,
        height,
        sse: fit.sse,
        iterations: fit.iterations,
    })
}

/// Fit every column of the spectrum matrix, in column order.
///
/// Columns are processed strictly sequentially; a failed column is recorded
/// in `skipped` (and warned about) while the loop moves on. Only structural
/// problems that poison the whole run are fatal here:
///
/// - frequency axis length differing from the matrix row count (exit 2)
/// - an empty matrix (exit 3)
/// - unusable fit options (exit 4)
pub fn fit_all(
    frequencies: &[f64],
    matrix: &DMatrix<f64>,
    opts: &FitOptions,
) -> Result<SpectrumAnalysis, AppError> {
    if frequencies.len() != matrix.nrows() {
        return Err(AppError::new(
            2,
            format!(
                "Frequency axis has {} values but the spectrum matrix has {} rows.",
                frequencies.len(),
                matrix.nrows()
            ),
        ));
    }
    if matrix.nrows() == 0 {
        return Err(AppError::new(3, "Spectrum matrix has no frequency samples."));
    }
    if !opts.hwhm_guess.is_finite() || opts.hwhm_guess == 0.0 {
        return Err(AppError::new(4, "Initial half-width guess must be finite and non-zero."));
    }
    if !opts.offset_guess.is_finite() {
        return Err(AppError::new(4, "Initial offset guess must be finite."));
    }
    if opts.max_iterations == 0 {
        return Err(AppError::new(4, "Iteration cap must be at least 1."));
    }

    let mut analysis = SpectrumAnalysis::default();
    for i in 0..matrix.ncols() {
        let column: Vec<f64> = matrix.column(i).iter().copied().collect();
        match fit_column(frequencies, &column, i, opts) {
            Ok(peak) => analysis.peaks.push(peak),
            Err(failure) => {
                log::warn!("Fitting failed for phonon {}: {failure}", i + 1);
                analysis.skipped.push(SkippedMode {
                    mode: i,
                    reason: failure.reason().to_string(),
                });
            }
        }
    }
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lorentzian_curve;

    fn axis_0_to_4() -> Vec<f64> {
        (0..=40).map(|i| i as f64 * 0.1).collect()
    }

    #[test]
    fn covariance_error_is_mean_of_all_entries() {
        assert_eq!(covariance_error(&DMatrix::zeros(4, 4)), 0.0);

        // Alternating +v/-v averages to zero.
        let alternating = DMatrix::from_fn(4, 4, |r, c| if (r + c) % 2 == 0 { 0.25 } else { -0.25 });
        assert!(covariance_error(&alternating).abs() < 1e-15);

        let constant = DMatrix::from_element(4, 4, -3.5);
        assert!((covariance_error(&constant) - 3.5).abs() < 1e-15);
    }

    #[test]
    fn initial_guess_takes_first_maximum_on_ties() {
        let freqs = [0.0, 1.0, 2.0, 3.0];
        let column = [0.5, 2.0, 2.0, 1.0];
        let opts = FitOptions::default();
        let guess = initial_guess(&freqs, &column, &opts).unwrap();
        assert_eq!(guess.center, 1.0);
        assert_eq!(guess.amplitude, 2.0);
        assert_eq!(guess.hwhm, 0.1);
        assert_eq!(guess.offset, 0.0);
    }

    #[test]
    fn recovers_known_peak_parameters() {
        let freqs = axis_0_to_4();
        let truth = PeakParams::new(2.0, 0.3, 5.0, 0.1);
        let column = lorentzian_curve(&freqs, &truth);

        let fit = fit_column(&freqs, &column, 0, &FitOptions::default()).unwrap();
        assert!((fit.params.center - 2.0).abs() < 1e-3);
        assert!((fit.params.hwhm - 0.3).abs() < 1e-3);
        assert!((fit.params.amplitude - 5.0).abs() < 1e-3);
        assert!((fit.params.offset - 0.1).abs() < 1e-3);
        assert!((fit.width - 0.6).abs() < 1e-3);
        assert!(fit.error.is_finite());
        assert_eq!(fit.height, column.iter().cloned().fold(f64::MIN, f64::max));
    }

    #[test]
    fn all_zero_column_fails() {
        let freqs = axis_0_to_4();
        let column = vec![0.0; freqs.len()];
        assert!(fit_column(&freqs, &column, 0, &FitOptions::default()).is_err());
    }

    #[test]
    fn batch_skips_failed_columns_and_keeps_going() {
        let freqs = axis_0_to_4();
        let good_a = lorentzian_curve(&freqs, &PeakParams::new(1.0, 0.2, 3.0, 0.0));
        let zeros = vec![0.0; freqs.len()];
        let good_b = lorentzian_curve(&freqs, &PeakParams::new(3.0, 0.4, 6.0, 0.05));

        let mut matrix = DMatrix::zeros(freqs.len(), 3);
        for (j, col) in [&good_a, &zeros, &good_b].iter().enumerate() {
            for (i, &v) in col.iter().enumerate() {
                matrix[(i, j)] = v;
            }
        }

        let analysis = fit_all(&freqs, &matrix, &FitOptions::default()).unwrap();
        assert_eq!(analysis.peaks.len(), 2);
        assert_eq!(analysis.skipped.len(), 1);
        assert_eq!(analysis.peaks[0].mode, 0);
        assert_eq!(analysis.peaks[1].mode, 2);
        assert_eq!(analysis.skipped[0].mode, 1);
        assert_eq!(analysis.total_modes(), 3);
    }

    #[test]
    fn axis_length_mismatch_is_a_precondition_error() {
        let freqs = axis_0_to_4();
        let matrix = DMatrix::zeros(freqs.len() + 1, 2);
        let err = fit_all(&freqs, &matrix, &FitOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let err = fit_all(&[], &DMatrix::zeros(0, 0), &FitOptions::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
