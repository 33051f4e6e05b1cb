//! Figure rendering for precipitation comparisons.
//!
//! Implements:
//! - Classed precipitation maps (mm/day)
//! - Log-power spectrum heatmaps
//! - Line charts of radial profiles
//! - Side-by-side panel composition and PNG encoding

pub mod canvas;
pub mod chart;
pub mod figure;
pub mod gradient;
pub mod png;
pub mod style;

pub use canvas::Canvas;
pub use chart::{AxisScale, LineChart, Series};
pub use figure::{comparison_figure, precipitation_map, spectral_figure, spectrum_heatmap};
pub use gradient::{Color, ColorRamp, DiscreteColormap, Origin};
pub use style::FigureStyle;
