//! Common types and utilities shared across the precip-spectra crates.

pub mod aliases;
pub mod coords;
pub mod error;
pub mod field;
pub mod stats;
pub mod time;
pub mod units;

pub use aliases::{resolve, resolve_with_override, VariableRole};
pub use coords::GridCoords;
pub use error::{PrecipError, PrecipResult};
pub use field::Field;
pub use stats::FieldStats;
pub use time::{CfTimeUnits, TimeAxis};
pub use units::{MissingUnitPolicy, PrecipUnit, RateUnit};
