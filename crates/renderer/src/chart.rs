//! Line charts of radial spectra and efficiency ratios.

use precip_common::{PrecipError, PrecipResult};

use crate::canvas::Canvas;
use crate::gradient::Color;
use crate::style::FigureStyle;

const MARGIN: usize = 24;
const GRID_DIVISIONS: usize = 5;
const SWATCH: usize = 10;

/// Axis mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisScale {
    #[default]
    Linear,
    /// Plot `log10(value)`; non-positive values are skipped.
    Log10,
}

impl AxisScale {
    fn apply(self, v: f64) -> Option<f64> {
        let out = match self {
            AxisScale::Linear => v,
            AxisScale::Log10 if v > 0.0 => v.log10(),
            AxisScale::Log10 => return None,
        };
        out.is_finite().then_some(out)
    }
}

/// One named line, sampled at x = 0, 1, 2, ...
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }
}

/// A multi-series line chart with a framed plot area, grid and legend swatches.
#[derive(Debug, Clone)]
pub struct LineChart {
    pub width: usize,
    pub height: usize,
    pub style: FigureStyle,
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
    series: Vec<Series>,
}

impl LineChart {
    pub fn new(width: usize, height: usize, style: FigureStyle) -> Self {
        Self {
            width,
            height,
            style,
            x_scale: AxisScale::Linear,
            y_scale: AxisScale::Linear,
            series: Vec::new(),
        }
    }

    pub fn with_scales(mut self, x_scale: AxisScale, y_scale: AxisScale) -> Self {
        self.x_scale = x_scale;
        self.y_scale = y_scale;
        self
    }

    pub fn add_series(&mut self, series: Series) -> &mut Self {
        self.series.push(series);
        self
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Mapped `(x, y)` points of one series.
    fn points(&self, series: &Series) -> Vec<Option<(f64, f64)>> {
        series
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| Some((self.x_scale.apply(i as f64)?, self.y_scale.apply(v)?)))
            .collect()
    }

    /// Bounds over every plottable point, padded when degenerate.
    fn data_bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut bounds: Option<((f64, f64), (f64, f64))> = None;
        for s in &self.series {
            for (x, y) in self.points(s).into_iter().flatten() {
                bounds = Some(match bounds {
                    None => ((x, x), (y, y)),
                    Some(((x0, x1), (y0, y1))) => ((x0.min(x), x1.max(x)), (y0.min(y), y1.max(y))),
                });
            }
        }
        bounds.map(|(xr, yr)| (pad(xr), pad(yr)))
    }

    /// Draw the chart. Fails when no series has a plottable point.
    pub fn render(&self) -> PrecipResult<Canvas> {
        if self.width <= 2 * MARGIN || self.height <= 2 * MARGIN {
            return Err(PrecipError::Render(format!(
                "chart of {}x{} pixels leaves no plot area",
                self.width, self.height
            )));
        }
        let ((x0, x1), (y0, y1)) = self.data_bounds().ok_or_else(|| {
            PrecipError::Render("line chart has no finite points to draw".to_string())
        })?;

        let mut canvas = Canvas::new(self.width, self.height, self.style.background());
        let plot_w = self.width - 2 * MARGIN;
        let plot_h = self.height - 2 * MARGIN;
        let to_px = |x: f64, y: f64| -> (i64, i64) {
            let px = MARGIN as f64 + (x - x0) / (x1 - x0) * (plot_w - 1) as f64;
            let py = MARGIN as f64 + (1.0 - (y - y0) / (y1 - y0)) * (plot_h - 1) as f64;
            (px.round() as i64, py.round() as i64)
        };

        let grid = self.style.grid();
        for i in 1..GRID_DIVISIONS {
            let gx = (MARGIN + i * (plot_w - 1) / GRID_DIVISIONS) as i64;
            let gy = (MARGIN + i * (plot_h - 1) / GRID_DIVISIONS) as i64;
            canvas.draw_line(gx, MARGIN as i64, gx, (MARGIN + plot_h - 1) as i64, grid);
            canvas.draw_line(MARGIN as i64, gy, (MARGIN + plot_w - 1) as i64, gy, grid);
        }
        canvas.stroke_rect(MARGIN, MARGIN, plot_w, plot_h, self.style.foreground());

        let palette = self.style.series_colors();
        for (k, series) in self.series.iter().enumerate() {
            let color = palette[k % palette.len()];
            let mut prev: Option<(i64, i64)> = None;
            for point in self.points(series) {
                match point {
                    Some((x, y)) => {
                        let p = to_px(x, y);
                        match prev {
                            Some(q) => canvas.draw_line(q.0, q.1, p.0, p.1, color),
                            None => canvas.set_pixel(p.0, p.1, color),
                        }
                        prev = Some(p);
                    }
                    None => prev = None,
                }
            }
            self.draw_swatch(&mut canvas, k, color);
        }
        Ok(canvas)
    }

    /// Legend swatch for series `k`, stacked down the top-right corner.
    fn draw_swatch(&self, canvas: &mut Canvas, k: usize, color: Color) {
        let x = self.width - MARGIN - 2 * SWATCH;
        let y = MARGIN + SWATCH / 2 + k * (SWATCH + 4);
        canvas.fill_rect(x, y, SWATCH, SWATCH, color);
        canvas.stroke_rect(x, y, SWATCH, SWATCH, self.style.foreground());
    }
}

fn pad((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi - lo > f64::EPSILON * hi.abs().max(1.0) {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}
