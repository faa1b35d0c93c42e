//! Plotters-powered spectrum chart widget for Ratatui.
//!
//! The in-terminal chart goes through Plotters (rendered into the Ratatui
//! buffer by `plotters-ratatui-backend`) rather than Ratatui's own `Chart`
//! widget: the PNG renderer already speaks Plotters, and axes and tick
//! labels need much less hand-rolling that way.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Render-only description of one peak chart.
///
/// Series, bounds, and labels all arrive precomputed, so `render()` does
/// nothing but draw and the data prep stays testable on its own.
pub struct PeakPlottersChart<'a> {
    /// Line series for the fitted lineshape.
    pub fitted: &'a [(f64, f64)],
    /// Scatter series for the observed power spectrum.
    pub observed: &'a [(f64, f64)],
    /// Width annotation and its anchor in data coordinates, if any.
    pub annotation: Option<(&'a str, (f64, f64))>,
    /// Frequency bounds.
    pub x_bounds: [f64; 2],
    /// Intensity bounds.
    pub y_bounds: [f64; 2],
    /// Axis labels. The y label is built per figure, so it is owned.
    pub x_label: &'a str,
    pub y_label: String,
    /// Tick label formatters.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for PeakPlottersChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a chart in a handful of cells; show a hint
        // instead of letting the backend panic.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Terminal too small for the chart.",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        let degenerate =
            [x0, x1, y0, y1].iter().any(|v| !v.is_finite()) || x1 <= x0 || y1 <= y0;
        if degenerate {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Label areas are measured in cells here, not pixels.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes + tick labels. Mesh lines are disabled: at terminal
            // resolution they swallow the spectrum samples.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(&self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Observed samples go first so the fitted line stays visible on
            // top of a dense spectrum. `Pixel` rather than `Circle`: the
            // underlying backend maps circle radii incorrectly (pixel radius
            // -> normalized canvas units), producing huge circles.
            chart.draw_series(
                self.observed
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), WHITE)),
            )?;

            let fit_color = RGBColor(0, 255, 255); // cyan
            chart.draw_series(LineSeries::new(self.fitted.iter().copied(), &fit_color))?;

            if let Some((text, anchor)) = self.annotation {
                chart.draw_series(std::iter::once(Text::new(
                    text.to_string(),
                    anchor,
                    ("sans-serif", 10).into_font().color(&fit_color),
                )))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
