//! Formatted terminal output.
//!
//! Every report string is assembled here and nowhere else; the snapshot
//! tests below pin the exact layout, and the fit code never formats.

use crate::domain::{DatasetStats, PeakFit, ReportStyle, SpectrumAnalysis, SpectrumData};

/// Dash count of the separator line under each `Peak #<n>` header.
const SEPARATOR_WIDTH: usize = 36;

/// Format the report block for one fitted peak:
///
/// ```text
/// Peak #1
/// ------------------------------------
/// Width(FWHM): 0.600000 THz
/// Position: 2.000000 THz
/// Fitting Error: 0.000000
/// ```
///
/// Width and position carry the unit label; the error is the unitless scalar
/// covariance summary.
pub fn format_peak_block(fit: &PeakFit, style: &ReportStyle) -> String {
    let mut out = String::new();
    out.push_str(&format!("Peak #{}\n", fit.mode + 1));
    out.push_str(&"-".repeat(SEPARATOR_WIDTH));
    out.push('\n');
    out.push_str(&format!(
        "Width(FWHM): {:.prec$} {}\n",
        fit.width,
        style.unit,
        prec = style.decimals
    ));
    out.push_str(&format!(
        "Position: {:.prec$} {}\n",
        fit.params.center,
        style.unit,
        prec = style.decimals
    ));
    out.push_str(&format!(
        "Fitting Error: {:.prec$}\n",
        fit.error,
        prec = style.decimals
    ));
    out
}

/// Format all successful peaks, one block each, with a blank line before
/// every block.
pub fn format_report(analysis: &SpectrumAnalysis, style: &ReportStyle) -> String {
    let mut out = String::new();
    for fit in &analysis.peaks {
        out.push('\n');
        out.push_str(&format_peak_block(fit, style));
    }
    out
}

/// The in-figure annotation: `Width: ` plus the width right-aligned in 10
/// columns at the configured number of decimals.
pub fn format_annotation(width: f64, style: &ReportStyle) -> String {
    format!("Width: {:10.prec$}", width, prec = style.annotation_decimals)
}

/// Format the run summary (dataset stats + fit outcome counts).
pub fn format_run_summary(
    data: &SpectrumData,
    stats: &DatasetStats,
    analysis: &SpectrumAnalysis,
    style: &ReportStyle,
) -> String {
    let mut out = String::new();

    out.push_str("=== phonofit - Lorentzian peak fit ===\n");
    out.push_str(&format!("Source: {}\n", data.source));
    out.push_str(&format!(
        "Data: modes={} | samples={} | frequency=[{:.3}, {:.3}] {} | intensity=[{:.2}, {:.2}]\n",
        stats.modes,
        stats.samples,
        stats.freq_min,
        stats.freq_max,
        style.unit,
        stats.intensity_min,
        stats.intensity_max
    ));
    out.push_str(&format!(
        "Fitted: {} | skipped: {}\n",
        analysis.peaks.len(),
        analysis.skipped.len()
    ));
    for skip in &analysis.skipped {
        out.push_str(&format!("  (skipped phonon {}) {}\n", skip.mode + 1, skip.reason));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PeakFit, PeakParams};
    use nalgebra::DMatrix;

    fn peak(mode: usize, center: f64, hwhm: f64) -> PeakFit {
        PeakFit {
            mode,
            params: PeakParams::new(center, hwhm, 5.0, 0.1),
            covariance: [[0.0; 4]; 4],
            width: 2.0 * hwhm,
            error: 0.000012,
            height: 5.3,
            sse: 1e-9,
            iterations: 7,
        }
    }

    #[test]
    fn peak_block_layout_is_stable() {
        let style = ReportStyle::default();
        let got = format_peak_block(&peak(0, 2.0, 0.3), &style);
        let want = "Peak #1\n\
                    ------------------------------------\n\
                    Width(FWHM): 0.600000 THz\n\
                    Position: 2.000000 THz\n\
                    Fitting Error: 0.000012\n";
        assert_eq!(got, want);
    }

    #[test]
    fn report_prefixes_each_block_with_a_blank_line() {
        let style = ReportStyle::default();
        let analysis = SpectrumAnalysis {
            peaks: vec![peak(0, 2.0, 0.3), peak(3, 1.0, 0.2)],
            skipped: vec![],
        };
        let report = format_report(&analysis, &style);
        assert!(report.starts_with("\nPeak #1\n"));
        assert!(report.contains("\nPeak #4\n"));
        assert_eq!(report.matches("Width(FWHM):").count(), 2);
    }

    #[test]
    fn annotation_right_aligns_to_ten_columns() {
        let style = ReportStyle::default();
        assert_eq!(format_annotation(0.6, &style), "Width:     0.6000");
        assert_eq!(format_annotation(12.34567, &style), "Width:    12.3457");
    }

    #[test]
    fn run_summary_lists_skips() {
        let style = ReportStyle::default();
        let data = SpectrumData {
            frequencies: vec![0.0, 1.0],
            matrix: DMatrix::from_row_slice(2, 1, &[1.0, 2.0]),
            source: "test".to_string(),
        };
        let stats = data.stats();
        let analysis = SpectrumAnalysis {
            peaks: vec![],
            skipped: vec![crate::domain::SkippedMode {
                mode: 1,
                reason: "no convergence".to_string(),
            }],
        };
        let summary = format_run_summary(&data, &stats, &analysis, &style);
        assert!(summary.contains("Fitted: 0 | skipped: 1"));
        assert!(summary.contains("(skipped phonon 2) no convergence"));
    }
}
