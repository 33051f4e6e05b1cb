//! Composed figures: precipitation maps, spectrum heatmaps and their panels.

use precip_common::{Field, PrecipError, PrecipResult};
use tracing::debug;

use crate::canvas::Canvas;
use crate::chart::LineChart;
use crate::gradient::{
    finite_range, render_discrete, render_ramp, resample_nearest, ColorRamp, DiscreteColormap,
    Origin,
};
use crate::style::FigureStyle;

/// Longest side of a map or heatmap panel, in pixels.
pub const PANEL_SIZE: usize = 480;

const COLORBAR_HEIGHT: usize = 14;
const COLORBAR_GAP: usize = 8;
const PANEL_GAP: usize = 16;

/// Integer upscale factor bringing the longest side close to `target`.
fn upscale_factor(ny: usize, nx: usize, target: usize) -> usize {
    (target / ny.max(nx).max(1)).max(1)
}

fn map_dims(field: &Field) -> PrecipResult<(Field, usize, usize)> {
    let field = field.time_mean()?;
    let (ny, nx) = field.spatial_dims()?;
    if ny == 0 || nx == 0 {
        return Err(PrecipError::Render(format!(
            "cannot draw an empty {}x{} field",
            ny, nx
        )));
    }
    Ok((field, ny, nx))
}

/// Horizontal strip of equal-width class swatches.
fn colorbar(cmap: &DiscreteColormap, width: usize, style: FigureStyle) -> Canvas {
    let swatches = cmap.swatches();
    let mut bar = Canvas::new(width, COLORBAR_HEIGHT, style.background());
    let n = swatches.len();
    for (i, color) in swatches.iter().enumerate() {
        let x0 = i * width / n;
        let x1 = (i + 1) * width / n;
        bar.fill_rect(x0, 0, x1 - x0, COLORBAR_HEIGHT, *color);
    }
    bar.stroke_rect(0, 0, width, COLORBAR_HEIGHT, style.foreground());
    bar
}

/// A precipitation map in mm/day with its class colorbar underneath.
///
/// 3D fields are averaged over time first. `NaN` cells are painted with the
/// style background.
pub fn precipitation_map(field: &Field, style: FigureStyle, origin: Origin) -> PrecipResult<Canvas> {
    let (field, ny, nx) = map_dims(field)?;
    let cmap = DiscreteColormap::precipitation();
    let pixels = render_discrete(&field.data, nx, ny, origin, &cmap, style.background());

    let k = upscale_factor(ny, nx, PANEL_SIZE);
    let (w, h) = (nx * k, ny * k);
    let map = Canvas::from_pixels(resample_nearest(&pixels, nx, ny, w, h), w, h)?;

    let mut panel = Canvas::new(w, h + COLORBAR_GAP + COLORBAR_HEIGHT, style.background());
    panel.blit(&map, 0, 0);
    panel.stroke_rect(0, 0, w, h, style.foreground());
    panel.blit(&colorbar(&cmap, w, style), 0, h + COLORBAR_GAP);

    debug!(variable = %field.name, ny, nx, scale = k, "Rendered precipitation map");
    Ok(panel)
}

/// Side-by-side maps on a shared color scale, e.g. GPM left and MPAS right.
pub fn comparison_figure(
    left: &Field,
    right: &Field,
    style: FigureStyle,
    origin: Origin,
) -> PrecipResult<Canvas> {
    let panels = [
        precipitation_map(left, style, origin)?,
        precipitation_map(right, style, origin)?,
    ];
    Ok(Canvas::hconcat(&panels, PANEL_GAP, style.background()))
}

/// A `log10` power array drawn through the continuous ramp, origin lower.
pub fn spectrum_heatmap(
    log_power: &[f64],
    ny: usize,
    nx: usize,
    style: FigureStyle,
) -> PrecipResult<Canvas> {
    if ny == 0 || nx == 0 || log_power.len() != ny * nx {
        return Err(PrecipError::Render(format!(
            "{} values for a {}x{} spectrum",
            log_power.len(),
            ny,
            nx
        )));
    }
    let data: Vec<f32> = log_power.iter().map(|&v| v as f32).collect();
    let range = finite_range(&data).unwrap_or((0.0, 1.0));
    let pixels = render_ramp(
        &data,
        nx,
        ny,
        Origin::Lower,
        range,
        &ColorRamp::viridis(),
        style.background(),
    );

    let k = upscale_factor(ny, nx, PANEL_SIZE);
    let (w, h) = (nx * k, ny * k);
    let mut panel = Canvas::from_pixels(resample_nearest(&pixels, nx, ny, w, h), w, h)?;
    panel.stroke_rect(0, 0, w, h, style.foreground());
    Ok(panel)
}

/// Optional heatmaps followed by the chart, left to right.
pub fn spectral_figure(
    heatmaps: Vec<Canvas>,
    chart: &LineChart,
    style: FigureStyle,
) -> PrecipResult<Canvas> {
    let mut panels = heatmaps;
    panels.push(chart.render()?);
    Ok(Canvas::hconcat(&panels, PANEL_GAP, style.background()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Series;
    use crate::gradient::Color;

    #[test]
    fn test_upscale_factor() {
        assert_eq!(upscale_factor(10, 20, 480), 24);
        assert_eq!(upscale_factor(1000, 500, 480), 1);
    }

    #[test]
    fn test_map_paints_classes_and_missing() {
        // row 0 (south) heavy rain, row 1 missing
        let field = Field::new_2d("p", vec![60.0, 60.0, f32::NAN, f32::NAN], 2, 2).unwrap();
        let style = FigureStyle::Light;
        let panel = precipitation_map(&field, style, Origin::Lower).unwrap();

        let k = upscale_factor(2, 2, PANEL_SIZE);
        assert_eq!(panel.width(), 2 * k);
        assert_eq!(panel.height(), 2 * k + COLORBAR_GAP + COLORBAR_HEIGHT);
        // interior of the top half is the missing row
        assert_eq!(panel.pixel(k, k / 2), Some(style.background()));
        // interior of the bottom half is the over color
        assert_eq!(panel.pixel(k, k + k / 2), Color::from_hex("#bfbfbf"));
    }

    #[test]
    fn test_comparison_has_two_panels() {
        let a = Field::new_2d("a", vec![1.0; 4], 2, 2).unwrap();
        let single = precipitation_map(&a, FigureStyle::Black, Origin::Lower).unwrap();
        let both = comparison_figure(&a, &a, FigureStyle::Black, Origin::Lower).unwrap();
        assert_eq!(both.width(), 2 * single.width() + 3 * PANEL_GAP);
    }

    #[test]
    fn test_heatmap_rejects_bad_shape() {
        assert!(spectrum_heatmap(&[0.0; 3], 2, 2, FigureStyle::Black).is_err());
        assert!(spectrum_heatmap(&[0.0; 4], 2, 2, FigureStyle::Black).is_ok());
    }

    #[test]
    fn test_spectral_figure_appends_chart() {
        let mut chart = LineChart::new(200, 150, FigureStyle::Black);
        chart.add_series(Series::new("a", vec![1.0, 0.5, 0.25]));
        let fig = spectral_figure(Vec::new(), &chart, FigureStyle::Black).unwrap();
        assert_eq!(fig.width(), 200 + 2 * PANEL_GAP);
    }
}
