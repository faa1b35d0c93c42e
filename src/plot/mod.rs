//! Figure construction and rendering seams.
//!
//! The fitting loop yields one diagnostic figure per successful mode. All
//! figure data (series, annotation, labels) is computed here once; drawing
//! goes through the [`Renderer`] trait so the same run can print ASCII
//! charts, write PNG files, or open the interactive viewer without touching
//! the fit logic.

pub mod ascii;
pub mod png;

pub use ascii::AsciiRenderer;
pub use png::PngRenderer;

use crate::domain::{PeakFit, PeakRecord, ReportStyle, SpectrumData};
use crate::error::AppError;
use crate::models::lorentzian_curve;
use crate::report::format_annotation;

/// Legend label for the observed series.
pub const OBSERVED_LABEL: &str = "Power spectrum";
/// Legend label for the fitted series.
pub const FITTED_LABEL: &str = "Lorentzian fit";
/// Chart title shared by every figure.
pub const FIGURE_TITLE: &str = "Curve fitting";

/// Everything needed to draw one peak's diagnostic figure.
#[derive(Debug, Clone)]
pub struct PeakFigure {
    /// 1-based peak number, used in names and file names.
    pub number: usize,
    /// Figure name, e.g. `Phonon 3`.
    pub name: String,
    pub title: String,
    /// X-axis label, e.g. `Frequency [THz]`.
    pub x_label: String,
    /// Observed power spectrum, (frequency, intensity).
    pub observed: Vec<(f64, f64)>,
    /// Fitted lineshape over the full frequency axis.
    pub fitted: Vec<(f64, f64)>,
    /// Width annotation text, e.g. `Width:     0.6000`.
    pub annotation: String,
    /// Annotation anchor: (fitted center, half the observed peak height).
    pub annotation_at: (f64, f64),
    pub width: f64,
    pub position: f64,
    pub error: f64,
}

/// Build the figure for one fitted peak.
pub fn build_figure(data: &SpectrumData, fit: &PeakFit, style: &ReportStyle) -> PeakFigure {
    let observed: Vec<(f64, f64)> = data
        .frequencies
        .iter()
        .copied()
        .zip(data.matrix.column(fit.mode).iter().copied())
        .collect();
    let fitted: Vec<(f64, f64)> = data
        .frequencies
        .iter()
        .copied()
        .zip(lorentzian_curve(&data.frequencies, &fit.params))
        .collect();

    PeakFigure {
        number: fit.mode + 1,
        name: format!("Phonon {}", fit.mode + 1),
        title: FIGURE_TITLE.to_string(),
        x_label: style.frequency_label(),
        observed,
        fitted,
        annotation: format_annotation(fit.width, style),
        annotation_at: (fit.params.center, fit.height / 2.0),
        width: fit.width,
        position: fit.params.center,
        error: fit.error,
    }
}

/// Build one figure per successful fit, in mode order.
pub fn build_figures(data: &SpectrumData, peaks: &[PeakFit], style: &ReportStyle) -> Vec<PeakFigure> {
    peaks.iter().map(|fit| build_figure(data, fit, style)).collect()
}

/// Rebuild a figure from a saved results record.
///
/// Saved results carry only the fitted curve, so the observed series is
/// empty and renderers draw the lineshape alone.
pub fn figure_from_record(record: &PeakRecord, frequencies: &[f64], style: &ReportStyle) -> PeakFigure {
    let fitted: Vec<(f64, f64)> = frequencies
        .iter()
        .copied()
        .zip(record.curve.iter().copied())
        .collect();

    PeakFigure {
        number: record.peak,
        name: format!("Phonon {}", record.peak),
        title: FIGURE_TITLE.to_string(),
        x_label: style.frequency_label(),
        observed: Vec::new(),
        fitted,
        annotation: format_annotation(record.width, style),
        annotation_at: (record.params.center, record.height / 2.0),
        width: record.width,
        position: record.params.center,
        error: record.error,
    }
}

/// Rendering seam.
///
/// `draw_peak` is called once per successful mode, in mode order; `present`
/// once after the whole batch. Interactive implementations block in
/// `present` until the viewer closes.
pub trait Renderer {
    fn draw_peak(&mut self, figure: &PeakFigure) -> Result<(), AppError>;
    fn present(&mut self) -> Result<(), AppError>;
}

/// Min/max of one coordinate across both series of a figure.
///
/// Returns `None` when the extent is degenerate (no points, non-finite
/// values, or zero span), so callers can pick their own fallback.
pub(crate) fn series_range(
    figure: &PeakFigure,
    pick: impl Fn(&(f64, f64)) -> f64,
) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for point in figure.observed.iter().chain(&figure.fitted) {
        let v = pick(point);
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if min_v.is_finite() && max_v.is_finite() && max_v > min_v {
        Some((min_v, max_v))
    } else {
        None
    }
}
