//! ASCII plotting for terminal output.
//!
//! A fixed-size character grid, kept deliberately simple: the output is
//! deterministic, so golden tests can pin it down, and it reads fine in any
//! terminal.
//!
//! Grid marks: `o` for observed spectrum samples, `-` for the fitted
//! lineshape, and the width annotation written in at its anchor cell.

use crate::error::AppError;

use super::{series_range, PeakFigure, Renderer, FITTED_LABEL, OBSERVED_LABEL};

/// Buffers one ASCII chart per figure and prints them all in `present`.
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    rendered: Vec<String>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rendered: Vec::new(),
        }
    }
}

impl Renderer for AsciiRenderer {
    fn draw_peak(&mut self, figure: &PeakFigure) -> Result<(), AppError> {
        self.rendered
            .push(render_ascii_figure(figure, self.width, self.height));
        Ok(())
    }

    fn present(&mut self) -> Result<(), AppError> {
        for chart in &self.rendered {
            println!();
            print!("{chart}");
        }
        Ok(())
    }
}

/// Render one figure as a fixed-size character grid.
pub fn render_ascii_figure(figure: &PeakFigure, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = series_range(figure, |&(x, _)| x).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = series_range(figure, |&(_, y)| y).unwrap_or((0.0, 1.0));
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let (y_min, y_max) = (y_min - pad, y_max + pad);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first, so observed points can overlay it.
    draw_curve(&mut grid, &figure.fitted, x_min, x_max, y_min, y_max);
    for &(x, y) in &figure.observed {
        let col = col_for(x, x_min, x_max, width);
        let row = row_for(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }
    draw_annotation(
        &mut grid,
        &figure.annotation,
        figure.annotation_at,
        x_min,
        x_max,
        y_min,
        y_max,
    );

    let mut out = format!("{} - {}\n", figure.name, figure.title);
    out.push_str(&format!(
        "{}: [{x_min:.3}, {x_max:.3}] | intensity: [{y_min:.2}, {y_max:.2}]\n",
        figure.x_label
    ));
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    out.push_str(&format!("legend: o {OBSERVED_LABEL} | - {FITTED_LABEL}\n"));

    out
}

fn col_for(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let last = width.max(2) - 1;
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * last as f64).round() as usize
}

fn row_for(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let last = height.max(2) - 1;
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // row 0 is the top of the grid, so higher intensities map to lower rows
    (last as f64 - u * last as f64).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if curve.len() < 2 {
        return;
    }
    let (height, width) = (grid.len(), grid[0].len());

    let cells: Vec<(usize, usize)> = curve
        .iter()
        .map(|&(x, y)| {
            (
                col_for(x, x_min, x_max, width),
                row_for(y, y_min, y_max, height),
            )
        })
        .collect();

    grid[cells[0].1][cells[0].0] = '-';
    for pair in cells.windows(2) {
        let (c0, r0) = pair[0];
        let (c1, r1) = pair[1];
        draw_line(grid, c0, r0, c1, r1, '-');
    }
}

/// Bresenham segment between two grid cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let (mut x, mut y) = (x0 as isize, y0 as isize);
    let (x_end, y_end) = (x1 as isize, y1 as isize);

    let dx = (x_end - x).abs();
    let dy = -(y_end - y).abs();
    let step_x = if x < x_end { 1 } else { -1 };
    let step_y = if y < y_end { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        mark_if_empty(grid, x, y, ch);
        if x == x_end && y == y_end {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += step_x;
        }
        if e2 <= dx {
            err += dx;
            y += step_y;
        }
    }
}

fn mark_if_empty(grid: &mut [Vec<char>], x: isize, y: isize, ch: char) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if y < grid.len() && x < grid[0].len() && grid[y][x] == ' ' {
        grid[y][x] = ch;
    }
}

/// Write the annotation text into the grid, starting at its anchor cell.
/// Characters falling outside the grid are clipped.
fn draw_annotation(
    grid: &mut [Vec<char>],
    text: &str,
    at: (f64, f64),
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
) {
    if grid.is_empty() || text.is_empty() {
        return;
    }
    let (height, width) = (grid.len(), grid[0].len());
    let start = col_for(at.0, x_min, x_max, width);
    let row = row_for(at.1, y_min, y_max, height);
    for (offset, ch) in text.chars().enumerate() {
        let col = start + offset;
        if col >= width {
            break;
        }
        grid[row][col] = ch;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn figure_golden_snapshot_small() {
        let figure = PeakFigure {
            number: 1,
            name: "Phonon 1".to_string(),
            title: "Curve fitting".to_string(),
            x_label: "Frequency [THz]".to_string(),
            observed: vec![(0.0, 0.0), (2.0, 2.0), (4.0, 0.0)],
            fitted: vec![(0.0, 0.0), (4.0, 0.0)],
            annotation: "W".to_string(),
            annotation_at: (2.0, 1.0),
            width: 0.6,
            position: 2.0,
            error: 0.0,
        };

        let txt = render_ascii_figure(&figure, 11, 5);
        let expected = concat!(
            "Phonon 1 - Curve fitting\n",
            "Frequency [THz]: [0.000, 4.000] | intensity: [-0.10, 2.10]\n",
            "     o     \n",
            "           \n",
            "     W     \n",
            "           \n",
            "o---------o\n",
            "legend: o Power spectrum | - Lorentzian fit\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn annotation_clips_at_the_right_edge() {
        let figure = PeakFigure {
            number: 2,
            name: "Phonon 2".to_string(),
            title: "Curve fitting".to_string(),
            x_label: "Frequency [THz]".to_string(),
            observed: vec![(0.0, 0.0), (1.0, 1.0)],
            fitted: vec![(0.0, 0.0), (1.0, 0.0)],
            annotation: "Width:     0.6000".to_string(),
            annotation_at: (1.0, 0.5),
            width: 0.6,
            position: 1.0,
            error: 0.0,
        };
        // Anchor sits on the last column; only the first character fits.
        let txt = render_ascii_figure(&figure, 10, 5);
        assert!(txt.lines().any(|line| line.ends_with('W')));
        assert!(!txt.contains("Width:"));
    }

    #[test]
    fn renderer_buffers_until_present() {
        let figure = PeakFigure {
            number: 1,
            name: "Phonon 1".to_string(),
            title: "Curve fitting".to_string(),
            x_label: "Frequency [THz]".to_string(),
            observed: vec![(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)],
            fitted: vec![(0.0, 0.0), (2.0, 0.0)],
            annotation: "W".to_string(),
            annotation_at: (1.0, 0.5),
            width: 0.6,
            position: 1.0,
            error: 0.0,
        };
        let mut renderer = AsciiRenderer::new(20, 8);
        renderer.draw_peak(&figure).unwrap();
        renderer.draw_peak(&figure).unwrap();
        assert_eq!(renderer.rendered.len(), 2);
    }
}
