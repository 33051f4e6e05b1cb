//! Spectral analysis of precipitation fields.
//!
//! A field is transformed with a 2D FFT, reduced to squared magnitudes with
//! the zero frequency moved to the centre, then averaged over rings of equal
//! integer radius:
//!
//! ```text
//! Field ──► prepare (fill NaN, standardize) ──► compute_spectrum ──► radial_mean
//!                                                                      │
//!                               spectral_efficiency(profile_a, profile_b) ◄┘
//! ```

pub mod prepare;
pub mod radial;
pub mod spectrum;

pub use prepare::{fill_missing, standardize};
pub use radial::{radial_mean, spectral_efficiency, CenterConvention, RadialProfile, EFFICIENCY_EPS};
pub use spectrum::{compute_spectrum, fftshift, PowerSpectrum2D, SpectrumNormalization};
