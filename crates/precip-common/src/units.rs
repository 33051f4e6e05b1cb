//! Precipitation unit recognition and rate conversion.
//!
//! Source files disagree on how precipitation is expressed: IMERG ships
//! `mm/hr`, reanalysis products use `kg m-2 s-1`, remapped intermediates may
//! carry `mm/day` or nothing at all. Everything is brought onto a common rate
//! base (mm/h or mm/day) before fields are compared.
//!
//! Unit strings are matched case-insensitively with all whitespace removed,
//! so `"kg m-2 s-1"`, `"KG M-2 S-1"` and `"kgm-2s-1"` are the same unit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PrecipError, PrecipResult};

/// A recognized precipitation rate unit as declared by a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrecipUnit {
    MmPerHour,
    MmPerDay,
    /// Mass flux; 1 kg m-2 of water is 1 mm of depth.
    KgPerM2PerS,
}

/// How to treat a field whose `units` attribute is absent or empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingUnitPolicy {
    /// Fail with `UnrecognizedUnit`.
    #[default]
    Reject,
    /// Treat the field as mm/h. Compatibility with remapped files written
    /// without a units attribute.
    AssumeMmPerHour,
}

/// The common rate base fields are converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RateUnit {
    #[default]
    MmPerHour,
    MmPerDay,
}

/// Lowercase and strip whitespace so unit spellings compare equal.
pub fn normalize_unit_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

impl PrecipUnit {
    /// Recognize a unit string, returning `None` for unknown spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_unit_key(raw).as_str() {
            "mm/h" | "mm/hr" | "mmhr" | "mm_per_hour" => Some(PrecipUnit::MmPerHour),
            "mm/day" | "mm/d" | "mm_per_day" => Some(PrecipUnit::MmPerDay),
            "kgm-2s-1" | "kgm^-2s^-1" | "kg/m^2/s" | "kg/m2/s" | "mm/s" => {
                Some(PrecipUnit::KgPerM2PerS)
            }
            _ => None,
        }
    }

    /// Resolve a declared `units` attribute under the given policy.
    pub fn from_attribute(attr: Option<&str>, policy: MissingUnitPolicy) -> PrecipResult<Self> {
        let declared = attr.map(str::trim).filter(|s| !s.is_empty());
        match (declared, policy) {
            (Some(raw), _) => {
                Self::parse(raw).ok_or_else(|| PrecipError::UnrecognizedUnit(format!("{:?}", raw)))
            }
            (None, MissingUnitPolicy::AssumeMmPerHour) => Ok(PrecipUnit::MmPerHour),
            (None, MissingUnitPolicy::Reject) => Err(PrecipError::UnrecognizedUnit(
                "no 'units' attribute".to_string(),
            )),
        }
    }

    /// Convert one sample in this unit to mm/h.
    #[inline]
    pub fn to_mm_per_hour(self, value: f32) -> f32 {
        match self {
            PrecipUnit::MmPerHour => value,
            PrecipUnit::MmPerDay => value / 24.0,
            PrecipUnit::KgPerM2PerS => value * 3600.0,
        }
    }

    /// The rate unit this unit already matches, if any.
    pub fn as_rate_unit(self) -> Option<RateUnit> {
        match self {
            PrecipUnit::MmPerHour => Some(RateUnit::MmPerHour),
            PrecipUnit::MmPerDay => Some(RateUnit::MmPerDay),
            PrecipUnit::KgPerM2PerS => None,
        }
    }
}

impl RateUnit {
    /// Canonical attribute string written to output files.
    pub fn as_str(self) -> &'static str {
        match self {
            RateUnit::MmPerHour => "mm/h",
            RateUnit::MmPerDay => "mm/day",
        }
    }

    /// Convert one sample from mm/h to this unit.
    #[inline]
    pub fn from_mm_per_hour(self, value: f32) -> f32 {
        match self {
            RateUnit::MmPerHour => value,
            RateUnit::MmPerDay => value * 24.0,
        }
    }

    /// Convert one sample declared in `source` to this unit.
    ///
    /// Values already in the target unit pass through untouched.
    #[inline]
    pub fn convert(self, source: PrecipUnit, value: f32) -> f32 {
        if source.as_rate_unit() == Some(self) {
            return value;
        }
        self.from_mm_per_hour(source.to_mm_per_hour(value))
    }
}

impl FromStr for RateUnit {
    type Err = PrecipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm/h" | "mmhr" | "mm_per_hour" => Ok(RateUnit::MmPerHour),
            "mm/d" | "mm/day" | "mm_per_day" => Ok(RateUnit::MmPerDay),
            _ => Err(PrecipError::InvalidOutputUnit(s.to_string())),
        }
    }
}

impl fmt::Display for RateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
