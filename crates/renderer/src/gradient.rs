//! Value-to-color mapping and heatmap rendering for gridded fields.

use crate::style::hex_to_rgb;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        hex_to_rgb(hex).map(|(r, g, b)| Self::new(r, g, b, 255))
    }

    /// Linear blend towards `other` by `t` in `[0, 1]`.
    pub fn mix(self, other: Color, t: f32) -> Color {
        interpolate_color(self, other, t)
    }
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f32 * t_inv) + (color2.r as f32 * t)).round() as u8,
        ((color1.g as f32 * t_inv) + (color2.g as f32 * t)).round() as u8,
        ((color1.b as f32 * t_inv) + (color2.b as f32 * t)).round() as u8,
        ((color1.a as f32 * t_inv) + (color2.a as f32 * t)).round() as u8,
    )
}

/// Precipitation class boundaries in mm/day.
pub const PRECIP_BOUNDS_MM_DAY: [f32; 17] = [
    0.0, 1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 6.0, 8.0, 10.0, 14.0, 18.0, 22.0, 26.0, 30.0, 40.0, 50.0,
];

const PRECIP_COLORS: [&str; 17] = [
    "#000000", "#e6e6ff", "#b3b3ff", "#6666ff", "#000066", "#004000", "#008000", "#00cc00",
    "#66ff66", "#ffff00", "#ffcc00", "#ff9900", "#ff3300", "#cc0000", "#990000", "#660000",
    "#bfbfbf",
];

/// Piecewise-constant colormap over class boundaries.
///
/// `colors[i]` paints `[bounds[i], bounds[i + 1])`. Values below the first
/// bound take the first color, values at or above the last bound take
/// `over`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteColormap {
    bounds: Vec<f32>,
    colors: Vec<Color>,
    over: Color,
}

impl DiscreteColormap {
    /// `colors` must hold one entry per interval, `bounds.len() - 1`.
    pub fn new(bounds: Vec<f32>, colors: Vec<Color>, over: Color) -> Option<Self> {
        if bounds.len() < 2
            || colors.len() + 1 != bounds.len()
            || bounds.windows(2).any(|w| w[0] >= w[1])
        {
            return None;
        }
        Some(Self {
            bounds,
            colors,
            over,
        })
    }

    /// The daily precipitation scale: black below 1 mm/day, blues and
    /// greens for light rain, yellow to dark red for heavy rain, grey at
    /// 50 mm/day and beyond.
    pub fn precipitation() -> Self {
        let mut colors: Vec<Color> = PRECIP_COLORS
            .iter()
            .map(|h| Color::from_hex(h).unwrap_or(Color::new(0, 0, 0, 255)))
            .collect();
        let over = colors.pop().unwrap_or(Color::new(191, 191, 191, 255));
        Self {
            bounds: PRECIP_BOUNDS_MM_DAY.to_vec(),
            colors,
            over,
        }
    }

    pub fn bounds(&self) -> &[f32] {
        &self.bounds
    }

    /// Color for `value`, `None` for `NaN`.
    pub fn color_for(&self, value: f32) -> Option<Color> {
        if value.is_nan() {
            return None;
        }
        if value >= self.bounds[self.bounds.len() - 1] {
            return Some(self.over);
        }
        let idx = self.bounds.partition_point(|&b| b <= value);
        Some(self.colors[idx.saturating_sub(1)])
    }

    /// Interval colors followed by the over color, in order.
    pub fn swatches(&self) -> Vec<Color> {
        let mut all = self.colors.clone();
        all.push(self.over);
        all
    }
}

/// Continuous color ramp through evenly spaced stops.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<Color>,
}

impl ColorRamp {
    pub fn new(stops: Vec<Color>) -> Option<Self> {
        (stops.len() >= 2).then_some(Self { stops })
    }

    /// Dark purple through teal to yellow, for log-power heatmaps.
    pub fn viridis() -> Self {
        Self {
            stops: vec![
                Color::new(68, 1, 84, 255),
                Color::new(59, 82, 139, 255),
                Color::new(33, 145, 140, 255),
                Color::new(94, 201, 98, 255),
                Color::new(253, 231, 37, 255),
            ],
        }
    }

    /// Color at `t` in `[0, 1]`; out-of-range values are clamped.
    pub fn color_at(&self, t: f32) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let segments = (self.stops.len() - 1) as f32;
        let pos = t * segments;
        let i = (pos.floor() as usize).min(self.stops.len() - 2);
        interpolate_color(self.stops[i], self.stops[i + 1], pos - i as f32)
    }
}

/// Finite minimum and maximum of `data`, `None` if nothing is finite.
pub fn finite_range(data: &[f32]) -> Option<(f32, f32)> {
    data.iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

fn put(pixels: &mut [u8], idx: usize, color: Color) {
    let p = idx * 4;
    pixels[p] = color.r;
    pixels[p + 1] = color.g;
    pixels[p + 2] = color.b;
    pixels[p + 3] = color.a;
}

/// Row order of a grid relative to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Row 0 is the top image row.
    Upper,
    /// Row 0 is the bottom image row (ascending latitude, `imshow(origin="lower")`).
    Lower,
}

fn source_row(y: usize, height: usize, origin: Origin) -> usize {
    match origin {
        Origin::Upper => y,
        Origin::Lower => height - 1 - y,
    }
}

/// Render a grid through a discrete colormap; `NaN` cells take `missing`.
///
/// # Returns
/// RGBA pixel data (4 bytes per pixel)
pub fn render_discrete(
    data: &[f32],
    width: usize,
    height: usize,
    origin: Origin,
    cmap: &DiscreteColormap,
    missing: Color,
) -> Vec<u8> {
    let mut pixels = vec![0u8; width * height * 4];
    for y in 0..height {
        let row = source_row(y, height, origin);
        for x in 0..width {
            let value = data[row * width + x];
            put(&mut pixels, y * width + x, cmap.color_for(value).unwrap_or(missing));
        }
    }
    pixels
}

/// Render a grid through a continuous ramp scaled to `[min_val, max_val]`.
///
/// Non-finite cells take `missing`.
pub fn render_ramp(
    data: &[f32],
    width: usize,
    height: usize,
    origin: Origin,
    (min_val, max_val): (f32, f32),
    ramp: &ColorRamp,
    missing: Color,
) -> Vec<u8> {
    let mut pixels = vec![0u8; width * height * 4];

    let range = max_val - min_val;
    let range = if range.abs() < f32::EPSILON { 1.0 } else { range };

    for y in 0..height {
        let row = source_row(y, height, origin);
        for x in 0..width {
            let value = data[row * width + x];
            let color = if value.is_finite() {
                ramp.color_at((value - min_val) / range)
            } else {
                missing
            };
            put(&mut pixels, y * width + x, color);
        }
    }
    pixels
}

/// Resize RGBA pixels by nearest-neighbour sampling.
///
/// Class colors must survive scaling, so no blending takes place.
pub fn resample_nearest(
    pixels: &[u8],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Vec<u8> {
    if src_width == dst_width && src_height == dst_height {
        return pixels.to_vec();
    }

    let mut output = vec![0u8; dst_width * dst_height * 4];
    for y in 0..dst_height {
        let sy = (y * src_height / dst_height.max(1)).min(src_height.saturating_sub(1));
        for x in 0..dst_width {
            let sx = (x * src_width / dst_width.max(1)).min(src_width.saturating_sub(1));
            let s = (sy * src_width + sx) * 4;
            let d = (y * dst_width + x) * 4;
            output[d..d + 4].copy_from_slice(&pixels[s..s + 4]);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precipitation_classes() {
        let cmap = DiscreteColormap::precipitation();
        let black = Color::new(0, 0, 0, 255);
        assert_eq!(cmap.color_for(0.5), Some(black));
        assert_eq!(cmap.color_for(-1.0), Some(black));
        assert_eq!(cmap.color_for(1.0), Color::from_hex("#e6e6ff"));
        assert_eq!(cmap.color_for(12.0), Color::from_hex("#ffff00"));
        assert_eq!(cmap.color_for(49.9), Color::from_hex("#660000"));
        assert_eq!(cmap.color_for(50.0), Color::from_hex("#bfbfbf"));
        assert_eq!(cmap.color_for(f32::NAN), None);
        assert_eq!(cmap.swatches().len(), 17);
    }

    #[test]
    fn test_discrete_colormap_validates_lengths() {
        let c = Color::new(1, 2, 3, 255);
        assert!(DiscreteColormap::new(vec![0.0, 1.0], vec![c], c).is_some());
        assert!(DiscreteColormap::new(vec![0.0, 1.0], vec![c, c], c).is_none());
        assert!(DiscreteColormap::new(vec![1.0, 0.0], vec![c], c).is_none());
    }

    #[test]
    fn test_ramp_endpoints() {
        let ramp = ColorRamp::viridis();
        assert_eq!(ramp.color_at(0.0), Color::new(68, 1, 84, 255));
        assert_eq!(ramp.color_at(1.0), Color::new(253, 231, 37, 255));
        assert_eq!(ramp.color_at(2.0), ramp.color_at(1.0));
        assert_eq!(ramp.color_at(0.5), Color::new(33, 145, 140, 255));
    }

    #[test]
    fn test_render_discrete_flips_lower_origin() {
        let cmap = DiscreteColormap::precipitation();
        let missing = Color::new(9, 9, 9, 255);
        // bottom row dry, top row NaN
        let pixels = render_discrete(&[0.0, f32::NAN], 1, 2, Origin::Lower, &cmap, missing);
        assert_eq!(&pixels[0..4], &[9, 9, 9, 255]);
        assert_eq!(&pixels[4..8], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_finite_range_skips_nan() {
        assert_eq!(finite_range(&[f32::NAN, 2.0, -1.0]), Some((-1.0, 2.0)));
        assert_eq!(finite_range(&[f32::NAN]), None);
    }

    #[test]
    fn test_resample_nearest_keeps_colors() {
        let src = [1, 1, 1, 255, 2, 2, 2, 255];
        let out = resample_nearest(&src, 2, 1, 4, 2);
        assert_eq!(out.len(), 4 * 2 * 4);
        assert_eq!(&out[0..4], &[1, 1, 1, 255]);
        assert_eq!(&out[12..16], &[2, 2, 2, 255]);
    }
}
