//! Field transforms for the GPM/MPAS comparison pipeline.
//!
//! Every transform takes a [`Field`](precip_common::Field) by reference and
//! returns a new one:
//!
//! ```text
//! raw field ──► normalize (units / accumulators) ──► regrid ──► smooth
//!                                                       │
//!                                                       └──► trim ──► spectrum
//! ```

pub mod interpolation;
pub mod normalize;
pub mod regrid;
pub mod smooth;
pub mod trim;

pub use interpolation::bilinear;
pub use normalize::{accumulation_to_rate, sum_accumulators, AccumulationOptions, UnitNormalizer};
pub use regrid::RegridWeights;
pub use smooth::{gaussian, gaussian_kernel, moving_mean_3x3, smooth_field, SmoothedFields};
pub use trim::trim_edges;
