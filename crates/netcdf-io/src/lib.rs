//! NetCDF reading and writing for precipitation fields.
//!
//! [`Dataset`] resolves variables through the alias table in
//! `precip_common::aliases`, so GPM/IMERG, MPAS and remapped intermediates
//! are read through the same calls. [`FieldWriter`] writes derived fields
//! back with CF attributes.
//!
//! # Missing data
//!
//! `_FillValue` and `missing_value` samples are read as `NaN`. On write,
//! `NaN` is stored as [`FILL_VALUE_F32`] and declared as `_FillValue`, so a
//! written file reads back with the same `NaN` mask.

pub mod attrs;
pub mod error;
pub mod reader;
pub mod writer;

pub use attrs::{silence_hdf5_errors, FILL_VALUE_F32};
pub use error::{NetCdfError, NetCdfResult};
pub use reader::Dataset;
pub use writer::FieldWriter;
