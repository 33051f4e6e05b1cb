//! Figure styles and color parsing.

use precip_common::PrecipError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::gradient::Color;

/// Overall look of a figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FigureStyle {
    /// Black background, white axes.
    #[default]
    Black,
    /// White background, black axes.
    Light,
}

impl FigureStyle {
    pub fn background(self) -> Color {
        match self {
            FigureStyle::Black => Color::new(0, 0, 0, 255),
            FigureStyle::Light => Color::new(255, 255, 255, 255),
        }
    }

    pub fn foreground(self) -> Color {
        match self {
            FigureStyle::Black => Color::new(255, 255, 255, 255),
            FigureStyle::Light => Color::new(0, 0, 0, 255),
        }
    }

    /// Grid lines: the foreground at 30% over the background.
    pub fn grid(self) -> Color {
        self.background().mix(self.foreground(), 0.3)
    }

    /// Line colors for successive chart series.
    pub fn series_colors(self) -> [Color; 4] {
        let hex = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728"];
        hex.map(|h| Color::from_hex(h).unwrap_or(self.foreground()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FigureStyle::Black => "black",
            FigureStyle::Light => "light",
        }
    }
}

impl fmt::Display for FigureStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FigureStyle {
    type Err = PrecipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "black" | "dark" => Ok(FigureStyle::Black),
            "light" | "white" => Ok(FigureStyle::Light),
            other => Err(PrecipError::invalid_parameter(
                "style",
                format!("'{}' is not one of black, light", other),
            )),
        }
    }
}

/// Parse `#rrggbb` (leading `#` optional) to RGB.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#ff9900"), Some((255, 153, 0)));
        assert_eq!(hex_to_rgb("000066"), Some((0, 0, 102)));
        assert_eq!(hex_to_rgb("#fff"), None);
        assert_eq!(hex_to_rgb("#gg0000"), None);
    }

    #[test]
    fn test_style_colors_are_inverted() {
        assert_eq!(FigureStyle::Black.background(), FigureStyle::Light.foreground());
        assert_eq!(FigureStyle::Light.background(), FigureStyle::Black.foreground());
    }

    #[test]
    fn test_style_from_str() {
        assert_eq!("black".parse::<FigureStyle>().unwrap(), FigureStyle::Black);
        assert_eq!("Light".parse::<FigureStyle>().unwrap(), FigureStyle::Light);
        assert!("sepia".parse::<FigureStyle>().is_err());
    }
}
