//! PNG figure rendering via Plotters' bitmap backend.
//!
//! This is the non-interactive counterpart of the TUI viewer: one
//! `phonon_<n>.png` per fitted peak, with the observed spectrum, the fitted
//! lineshape (heavier stroke), a legend, and the width annotation placed at
//! the peak center.

use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::error::AppError;

use super::{series_range, PeakFigure, Renderer, FITTED_LABEL, OBSERVED_LABEL};

/// Writes one PNG per figure into a target directory.
pub struct PngRenderer {
    dir: PathBuf,
    width: u32,
    height: u32,
    written: Vec<PathBuf>,
}

impl PngRenderer {
    pub fn new(dir: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        Self {
            dir: dir.into(),
            width,
            height,
            written: Vec::new(),
        }
    }
}

impl Renderer for PngRenderer {
    fn draw_peak(&mut self, figure: &PeakFigure) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::new(
                4,
                format!("Failed to create {}: {e}", self.dir.display()),
            )
        })?;
        let path = self.dir.join(format!("phonon_{:02}.png", figure.number));
        write_peak_png(&path, figure, self.width, self.height)?;
        self.written.push(path);
        Ok(())
    }

    fn present(&mut self) -> Result<(), AppError> {
        log::info!(
            "wrote {} figure(s) under {}",
            self.written.len(),
            self.dir.display()
        );
        Ok(())
    }
}

/// Render one figure to `path`.
pub fn write_peak_png(
    path: &Path,
    figure: &PeakFigure,
    width: u32,
    height: u32,
) -> Result<(), AppError> {
    let err = |e: String| AppError::new(4, format!("Failed to render {}: {e}", path.display()));

    let (x_min, x_max) = series_range(figure, |&(x, _)| x).ok_or_else(|| {
        err("figure has no drawable frequency range".to_string())
    })?;
    let (y_min, y_max) = series_range(figure, |&(_, y)| y).ok_or_else(|| {
        err("figure has no drawable intensity range".to_string())
    })?;
    let y_pad = ((y_max - y_min) * 0.05).max(1e-12);
    let (y_min, y_max) = (y_min - y_pad, y_max + y_pad);

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| err(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} - {}", figure.name, figure.title),
            ("sans-serif", 24),
        )
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(56)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| err(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc("Intensity")
        .x_labels(8)
        .y_labels(6)
        .draw()
        .map_err(|e| err(e.to_string()))?;

    chart
        .draw_series(LineSeries::new(figure.observed.iter().copied(), &BLUE))
        .map_err(|e| err(e.to_string()))?
        .label(OBSERVED_LABEL)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], BLUE));

    chart
        .draw_series(LineSeries::new(
            figure.fitted.iter().copied(),
            RED.stroke_width(3),
        ))
        .map_err(|e| err(e.to_string()))?
        .label(FITTED_LABEL)
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], RED.stroke_width(3)));

    chart
        .draw_series(std::iter::once(Text::new(
            figure.annotation.clone(),
            figure.annotation_at,
            ("sans-serif", 16),
        )))
        .map_err(|e| err(e.to_string()))?;

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.85))
        .draw()
        .map_err(|e| err(e.to_string()))?;

    root.present().map_err(|e| err(e.to_string()))?;
    Ok(())
}

