//! RGBA drawing surface used to compose figure panels.

use std::path::Path;

use precip_common::{PrecipError, PrecipResult};
use tracing::info;

use crate::gradient::Color;
use crate::png::encode_png;

/// Row-major RGBA pixel buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Canvas {
    /// A canvas filled with `background`.
    pub fn new(width: usize, height: usize, background: Color) -> Self {
        let pixels = [background.r, background.g, background.b, background.a]
            .into_iter()
            .cycle()
            .take(width * height * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wrap rendered pixels; the length must be `width * height * 4`.
    pub fn from_pixels(pixels: Vec<u8>, width: usize, height: usize) -> PrecipResult<Self> {
        if pixels.len() != width * height * 4 {
            return Err(PrecipError::Render(format!(
                "{} bytes do not form a {}x{} RGBA image",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let p = (y * self.width + x) * 4;
        Some(Color::new(
            self.pixels[p],
            self.pixels[p + 1],
            self.pixels[p + 2],
            self.pixels[p + 3],
        ))
    }

    /// Set one pixel; coordinates outside the canvas are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let p = (y as usize * self.width + x as usize) * 4;
        self.pixels[p..p + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Color) {
        for yy in y..(y + h).min(self.height) {
            for xx in x..(x + w).min(self.width) {
                self.set_pixel(xx as i64, yy as i64, color);
            }
        }
    }

    /// One-pixel rectangle outline.
    pub fn stroke_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Color) {
        if w == 0 || h == 0 {
            return;
        }
        let (x0, y0) = (x as i64, y as i64);
        let (x1, y1) = ((x + w - 1) as i64, (y + h - 1) as i64);
        self.draw_line(x0, y0, x1, y0, color);
        self.draw_line(x0, y1, x1, y1, color);
        self.draw_line(x0, y0, x0, y1, color);
        self.draw_line(x1, y0, x1, y1, color);
    }

    /// Bresenham line between two points, both endpoints included.
    pub fn draw_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Copy `other` with its top-left corner at `(x, y)`, clipping at the edges.
    pub fn blit(&mut self, other: &Canvas, x: usize, y: usize) {
        for row in 0..other.height {
            let dy = y + row;
            if dy >= self.height {
                break;
            }
            let w = other.width.min(self.width.saturating_sub(x));
            if w == 0 {
                break;
            }
            let src = row * other.width * 4;
            let dst = (dy * self.width + x) * 4;
            self.pixels[dst..dst + w * 4].copy_from_slice(&other.pixels[src..src + w * 4]);
        }
    }

    /// Place panels left to right separated by `gap` pixels, vertically centred.
    pub fn hconcat(panels: &[Canvas], gap: usize, background: Color) -> Canvas {
        let width = panels.iter().map(|p| p.width).sum::<usize>()
            + gap * (panels.len() + 1);
        let height = panels.iter().map(|p| p.height).max().unwrap_or(0) + 2 * gap;
        let mut out = Canvas::new(width, height, background);

        let mut x = gap;
        for panel in panels {
            let y = gap + (height - 2 * gap - panel.height) / 2;
            out.blit(panel, x, y);
            x += panel.width + gap;
        }
        out
    }

    pub fn encode_png(&self) -> PrecipResult<Vec<u8>> {
        encode_png(&self.pixels, self.width, self.height)
    }

    /// Encode and write to `path`, creating parent directories.
    pub fn save_png(&self, path: &Path) -> PrecipResult<()> {
        let bytes = self.encode_png()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &bytes)?;
        info!(
            path = %path.display(),
            width = self.width,
            height = self.height,
            bytes = bytes.len(),
            "Saved figure"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Color = Color::new(255, 255, 255, 255);
    const RED: Color = Color::new(255, 0, 0, 255);

    #[test]
    fn test_line_includes_endpoints() {
        let mut c = Canvas::new(5, 5, WHITE);
        c.draw_line(0, 0, 4, 2, RED);
        assert_eq!(c.pixel(0, 0), Some(RED));
        assert_eq!(c.pixel(4, 2), Some(RED));
        assert_eq!(c.pixel(0, 4), Some(WHITE));
    }

    #[test]
    fn test_out_of_bounds_drawing_is_clipped() {
        let mut c = Canvas::new(3, 3, WHITE);
        c.draw_line(-5, 1, 10, 1, RED);
        assert_eq!(c.pixel(0, 1), Some(RED));
        assert_eq!(c.pixel(2, 1), Some(RED));
        c.fill_rect(2, 2, 10, 10, RED);
        assert_eq!(c.pixel(2, 2), Some(RED));
    }

    #[test]
    fn test_hconcat_places_panels() {
        let a = Canvas::new(2, 2, RED);
        let b = Canvas::new(3, 4, RED);
        let out = Canvas::hconcat(&[a, b], 1, WHITE);
        assert_eq!(out.width(), 2 + 3 + 3);
        assert_eq!(out.height(), 6);
        // first panel vertically centred: rows 2..4
        assert_eq!(out.pixel(1, 1), Some(WHITE));
        assert_eq!(out.pixel(1, 2), Some(RED));
        assert_eq!(out.pixel(4, 1), Some(RED));
    }

    #[test]
    fn test_from_pixels_checks_length() {
        assert!(Canvas::from_pixels(vec![0; 16], 2, 2).is_ok());
        assert!(Canvas::from_pixels(vec![0; 15], 2, 2).is_err());
    }
}
