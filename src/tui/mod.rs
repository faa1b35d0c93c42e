//! Interactive peak browser (Ratatui).
//!
//! The TUI is a read-only browser for fitted peaks: one chart per phonon mode
//! with the observed power spectrum and the fitted Lorentzian overlaid, plus
//! the peak statistics in the header. Left/Right move between peaks.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Terminal,
};

use crate::error::AppError;
use crate::plot::{series_range, PeakFigure, Renderer};

mod plotters_chart;

use plotters_chart::PeakPlottersChart;

/// Start the TUI over a set of fitted peak figures.
pub fn run(figures: Vec<PeakFigure>) -> Result<(), AppError> {
    if figures.is_empty() {
        println!("No successful fits to display.");
        return Ok(());
    }

    let _restore = TerminalGuard::new()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .map_err(|e| AppError::new(4, format!("Failed to set up the terminal: {e}")))?;

    App::new(figures).event_loop(&mut terminal)
}

/// [`Renderer`] that collects figures and opens the browser on `present`.
#[derive(Debug, Default)]
pub struct TuiRenderer {
    figures: Vec<PeakFigure>,
}

impl TuiRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for TuiRenderer {
    fn draw_peak(&mut self, figure: &PeakFigure) -> Result<(), AppError> {
        self.figures.push(figure.clone());
        Ok(())
    }

    fn present(&mut self) -> Result<(), AppError> {
        run(std::mem::take(&mut self.figures))
    }
}

/// Raw mode + alternate screen for the lifetime of the value; both are undone
/// on drop, panics included.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::new(4, format!("Failed to switch the terminal to raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to open the alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

struct App {
    figures: Vec<PeakFigure>,
    selected: usize,
    status: String,
}

impl App {
    fn new(figures: Vec<PeakFigure>) -> Self {
        let status = format!("{} fitted peak(s). Use arrow keys to browse.", figures.len());
        Self {
            figures,
            selected: 0,
            status,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut dirty = true;
        loop {
            if dirty {
                terminal
                    .draw(|frame| self.draw(frame))
                    .map_err(|e| AppError::new(4, format!("Failed to draw the interface: {e}")))?;
                dirty = false;
            }

            let ready = event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Failed to poll terminal events: {e}")))?;
            if !ready {
                continue;
            }

            let event = event::read()
                .map_err(|e| AppError::new(4, format!("Failed to read a terminal event: {e}")))?;
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if self.handle_key(key.code) {
                        return Ok(());
                    }
                    dirty = true;
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }
    }

    /// Returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let last = self.figures.len().saturating_sub(1);
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left | KeyCode::Char('h') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Right | KeyCode::Char('l') => self.selected = (self.selected + 1).min(last),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = last,
            _ => return false,
        }
        self.status = self.position_status();
        false
    }

    fn position_status(&self) -> String {
        format!("Peak {} of {}", self.selected + 1, self.figures.len())
    }

    fn current(&self) -> &PeakFigure {
        &self.figures[self.selected]
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let rows = Layout::vertical([
            Constraint::Length(5),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

        self.draw_header(frame, rows[0]);
        self.draw_chart(frame, rows[1]);
        self.draw_footer(frame, rows[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let figure = self.current();
        let dim = Style::default().fg(Color::Gray);

        let banner = Line::from(vec![
            Span::styled("phonofit", Style::default().fg(Color::Cyan)),
            Span::raw(" — Lorentzian peak browser"),
        ]);
        let context = Line::from(Span::styled(
            format!(
                "peak {}/{} | {} | {} samples",
                self.selected + 1,
                self.figures.len(),
                figure.name,
                figure.observed.len(),
            ),
            dim,
        ));
        let stats = Line::from(Span::styled(
            format!(
                "Width(FWHM): {:.4} | Position: {:.4} | Fitting Error: {:.6}",
                figure.width, figure.position, figure.error,
            ),
            dim,
        ));

        frame.render_widget(
            Paragraph::new(Text::from(vec![banner, context, stats]))
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let figure = self.current();

        let block = Block::default()
            .title(format!("{} — {}", figure.name, figure.title))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let (x_bounds, y_bounds) = chart_bounds(figure);
        let (chart_rect, insets) = chart_layout(inner);
        let annotation = (!figure.annotation.is_empty())
            .then_some((figure.annotation.as_str(), figure.annotation_at));

        let widget = PeakPlottersChart {
            fitted: &figure.fitted,
            observed: &figure.observed,
            annotation,
            x_bounds,
            y_bounds,
            x_label: &figure.x_label,
            y_label: "intensity".to_string(),
            fmt_x: fmt_axis_value,
            fmt_y: fmt_axis_value,
        };
        frame.render_widget(widget, chart_rect);

        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, x_bounds, y_bounds, &figure.x_label);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let keys = Span::styled(
            "←/→ peak  Home/End first/last  q quit",
            Style::default().fg(Color::Gray),
        );
        let status = Span::styled(&self.status, Style::default().fg(Color::Yellow));

        frame.render_widget(
            Paragraph::new(Line::from(vec![keys, Span::raw(" | "), status]))
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
    }
}

/// Chart bounds over both series, with a small vertical pad.
fn chart_bounds(figure: &PeakFigure) -> ([f64; 2], [f64; 2]) {
    let (x0, x1) = series_range(figure, |&(x, _)| x).unwrap_or((0.0, 1.0));
    let (y0, y1) = series_range(figure, |&(_, y)| y).unwrap_or((0.0, 1.0));
    let pad = ((y1 - y0).abs() * 0.05).max(1e-12);
    ([x0, x1], [y0 - pad, y1 + pad])
}

fn fmt_axis_value(v: f64) -> String {
    format!("{v:.2}")
}

/// Cells reserved around the plot body for the hand-drawn tick labels.
#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

const AXIS_TICKS: usize = 5;

/// Evenly spaced `(fraction, value)` pairs across a bounds pair.
fn tick_marks(bounds: [f64; 2]) -> impl Iterator<Item = (f64, f64)> {
    (0..AXIS_TICKS).map(move |i| {
        let frac = i as f64 / (AXIS_TICKS - 1) as f64;
        (frac, bounds[0] + frac * (bounds[1] - bounds[0]))
    })
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 8,
        right: 2,
        top: 1,
        bottom: 2,
    };

    let too_narrow = inner.width <= insets.left + insets.right + 10;
    let too_short = inner.height <= insets.top + insets.bottom + 5;
    if too_narrow || too_short {
        return (inner, None);
    }

    let body = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };
    (body, Some(insets))
}

fn place_label(frame: &mut ratatui::Frame<'_>, text: String, x: u16, y: u16, style: Style) {
    let width = text.len() as u16;
    frame.render_widget(
        Paragraph::new(text).style(style),
        Rect {
            x,
            y,
            width,
            height: 1,
        },
    );
}

fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    x_label: &str,
) {
    let dim = Style::default().fg(Color::Gray);

    let tick_row = chart.y + chart.height;
    if tick_row < inner.y + inner.height - 1 {
        for (frac, value) in tick_marks(x_bounds) {
            let label = format!("{value:.1}");
            let center = chart.x + ((chart.width - 1) as f64 * frac).round() as u16;
            let start = center.saturating_sub(label.len() as u16 / 2);
            place_label(frame, label, start, tick_row, dim);
        }
    }

    let label_end = inner.x + insets.left.saturating_sub(1);
    for (frac, value) in tick_marks(y_bounds) {
        let label = format!("{value:.2}");
        let start = label_end.saturating_sub(label.len() as u16);
        if start < inner.x {
            continue;
        }
        let row = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * frac).round() as u16;
        place_label(frame, label, start, row, dim);
    }

    let title_row = chart.y + chart.height + 1;
    if title_row < inner.y + inner.height {
        frame.render_widget(
            Paragraph::new(x_label.to_string())
                .alignment(Alignment::Center)
                .style(dim),
            Rect {
                x: chart.x,
                y: title_row,
                width: chart.width,
                height: 1,
            },
        );
    }

    frame.render_widget(
        Paragraph::new("intensity").style(dim.add_modifier(Modifier::BOLD)),
        Rect {
            x: inner.x,
            y: inner.y,
            width: insets.left.saturating_sub(1),
            height: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figure(n: usize) -> PeakFigure {
        PeakFigure {
            number: n,
            name: format!("Phonon {n}"),
            title: "Curve fitting".to_string(),
            x_label: "Frequency [THz]".to_string(),
            observed: vec![(0.0, 1.0), (1.0, 3.0), (2.0, 1.0)],
            fitted: vec![(0.0, 0.9), (1.0, 3.1), (2.0, 0.9)],
            annotation: String::new(),
            annotation_at: (1.0, 1.5),
            width: 0.5,
            position: 1.0,
            error: 0.01,
        }
    }

    #[test]
    fn navigation_is_clamped_to_the_figure_list() {
        let mut app = App::new(vec![figure(1), figure(2)]);
        assert_eq!(app.selected, 0);

        assert!(!app.handle_key(KeyCode::Left));
        assert_eq!(app.selected, 0);

        assert!(!app.handle_key(KeyCode::Right));
        assert_eq!(app.selected, 1);
        assert!(!app.handle_key(KeyCode::Right));
        assert_eq!(app.selected, 1);

        assert!(!app.handle_key(KeyCode::Home));
        assert_eq!(app.selected, 0);
        assert!(!app.handle_key(KeyCode::End));
        assert_eq!(app.selected, 1);

        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn chart_bounds_cover_both_series_with_y_padding() {
        let ([x0, x1], [y0, y1]) = chart_bounds(&figure(1));
        assert_eq!(x0, 0.0);
        assert_eq!(x1, 2.0);
        assert!(y0 < 0.9);
        assert!(y1 > 3.1);
    }

    #[test]
    fn tick_marks_span_the_bounds() {
        let marks: Vec<_> = tick_marks([2.0, 4.0]).collect();
        assert_eq!(marks.len(), AXIS_TICKS);
        assert_eq!(marks[0], (0.0, 2.0));
        assert_eq!(marks[AXIS_TICKS - 1], (1.0, 4.0));
    }
}
