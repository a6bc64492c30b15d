//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Each curve gets its own glyph (`*`, `+`, `x`, `#`, `%`, then repeating);
//! optional markers (e.g. calibration points) are drawn as `o` on top.
//! Non-finite values are skipped.

use crate::domain::CurveSeries;

const GLYPHS: [char; 5] = ['*', '+', 'x', '#', '%'];
const MARKER: char = 'o';

/// A curve to draw, with its legend label.
#[derive(Debug, Clone, Copy)]
pub struct PlotSeries<'a> {
    pub label: &'a str,
    pub series: &'a CurveSeries,
}

/// Render one or more curves on a shared grid.
pub fn render_ascii_plot(
    curves: &[PlotSeries<'_>],
    markers: &[(f64, f64)],
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let points: Vec<Vec<(f64, f64)>> = curves
        .iter()
        .map(|c| {
            c.series
                .times
                .iter()
                .zip(c.series.values.iter())
                .map(|(&t, &y)| (t, y))
                .filter(|(t, y)| t.is_finite() && y.is_finite())
                .collect()
        })
        .collect();

    let all = points.iter().flatten().chain(markers.iter());
    let (t_min, t_max, y_min, y_max) = ranges(all).unwrap_or((0.0, 1.0, 0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    for (i, curve) in points.iter().enumerate() {
        draw_curve(&mut grid, curve, GLYPHS[i % GLYPHS.len()], t_min, t_max, y_min, y_max);
    }
    for &(t, y) in markers {
        if t.is_finite() && y.is_finite() {
            let x = map_x(t, t_min, t_max, width);
            let yy = map_y(y, y_min, y_max, height);
            grid[yy][x] = MARKER;
        }
    }

    let y_label = curves
        .first()
        .map(|c| c.series.curve_type.display_name())
        .unwrap_or("y");

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: time=[{t_min:.3}, {t_max:.3}] | {y_label}=[{y_min:.3}, {y_max:.3}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    for (i, c) in curves.iter().enumerate() {
        out.push_str(&format!("  {} {}\n", GLYPHS[i % GLYPHS.len()], c.label));
    }
    out
}

fn ranges<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> Option<(f64, f64, f64, f64)> {
    let mut t_min = f64::INFINITY;
    let mut t_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for &(t, y) in points {
        if !(t.is_finite() && y.is_finite()) {
            continue;
        }
        t_min = t_min.min(t);
        t_max = t_max.max(t);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !(t_min.is_finite() && t_max > t_min && y_min.is_finite()) {
        return None;
    }
    if y_max <= y_min {
        // Flat curve: give it a unit band.
        return Some((t_min, t_max, y_min - 0.5, y_min + 0.5));
    }
    Some((t_min, t_max, y_min, y_max))
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    ch: char,
    t_min: f64,
    t_max: f64,
    y_min: f64,
    y_max: f64,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        match prev {
            Some((x0, y0)) => draw_line(grid, x0, y0, x, yy, ch),
            None if grid[yy][x] == ' ' => grid[yy][x] = ch,
            None => {}
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish). Occupied cells are left alone.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
