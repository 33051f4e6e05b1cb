//! Variable name resolution across GPM, MPAS and post-processed files.
//!
//! Each semantic role maps to an ordered list of accepted names; the first
//! name present in a dataset wins.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PrecipError, PrecipResult};

/// The semantic role a dataset variable plays in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableRole {
    Latitude,
    Longitude,
    Time,
    /// Precipitation rate in a raw GPM/IMERG file.
    Precipitation,
    /// Precipitation rate in a file already remapped to the model grid.
    RemappedPrecipitation,
    /// MPAS convective accumulated precipitation.
    ConvectiveAccumulation,
    /// MPAS grid-scale (non-convective) accumulated precipitation.
    GridScaleAccumulation,
}

const ALIAS_TABLE: &[(VariableRole, &[&str])] = &[
    (VariableRole::Latitude, &["lat", "latitude", "XLAT", "XLAT_M", "y"]),
    (VariableRole::Longitude, &["lon", "longitude", "XLONG", "XLONG_M", "x"]),
    (VariableRole::Time, &["time", "Time", "valid_time"]),
    (VariableRole::Precipitation, &["precipitation", "precipitationCal"]),
    (
        VariableRole::RemappedPrecipitation,
        &["precipitation_rate", "precipitation"],
    ),
    (VariableRole::ConvectiveAccumulation, &["rainc"]),
    (VariableRole::GridScaleAccumulation, &["rainnc"]),
];

impl VariableRole {
    /// Accepted names for this role, in priority order.
    pub fn aliases(self) -> &'static [&'static str] {
        ALIAS_TABLE
            .iter()
            .find(|(role, _)| *role == self)
            .map(|(_, names)| *names)
            .unwrap_or(&[])
    }

    pub fn label(self) -> &'static str {
        match self {
            VariableRole::Latitude => "latitude",
            VariableRole::Longitude => "longitude",
            VariableRole::Time => "time",
            VariableRole::Precipitation => "precipitation",
            VariableRole::RemappedPrecipitation => "remapped precipitation",
            VariableRole::ConvectiveAccumulation => "convective accumulation",
            VariableRole::GridScaleAccumulation => "grid-scale accumulation",
        }
    }
}

impl fmt::Display for VariableRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Return the first alias of `role` for which `is_present` holds.
pub fn resolve<F>(role: VariableRole, is_present: F) -> PrecipResult<&'static str>
where
    F: Fn(&str) -> bool,
{
    role.aliases()
        .iter()
        .copied()
        .find(|name| is_present(*name))
        .ok_or_else(|| {
            PrecipError::MissingVariable(format!(
                "no {} variable found (tried {:?})",
                role,
                role.aliases()
            ))
        })
}

/// Like [`resolve`], but an explicit name takes precedence over the table.
///
/// An explicit name that is not present is an error; it never falls back to
/// the aliases.
pub fn resolve_with_override<F>(
    role: VariableRole,
    explicit: Option<&str>,
    is_present: F,
) -> PrecipResult<String>
where
    F: Fn(&str) -> bool,
{
    match explicit {
        Some(name) if is_present(name) => Ok(name.to_string()),
        Some(name) => Err(PrecipError::MissingVariable(format!(
            "{} variable '{}' not found",
            role, name
        ))),
        None => resolve(role, is_present).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_alias_wins() {
        let present = ["latitude", "lat"];
        let name = resolve(VariableRole::Latitude, |n| present.contains(&n)).unwrap();
        assert_eq!(name, "lat");
    }

    #[test]
    fn test_wrf_style_names() {
        let present = ["XLAT_M", "XLONG_M"];
        assert_eq!(
            resolve(VariableRole::Latitude, |n| present.contains(&n)).unwrap(),
            "XLAT_M"
        );
        assert_eq!(
            resolve(VariableRole::Longitude, |n| present.contains(&n)).unwrap(),
            "XLONG_M"
        );
    }

    #[test]
    fn test_missing_role_lists_aliases() {
        let err = resolve(VariableRole::Time, |_| false).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("valid_time"), "message was: {msg}");
        assert!(matches!(err, PrecipError::MissingVariable(_)));
    }

    #[test]
    fn test_override_does_not_fall_back() {
        let present = ["rainc"];
        let err = resolve_with_override(
            VariableRole::ConvectiveAccumulation,
            Some("RAINC"),
            |n| present.contains(&n),
        )
        .unwrap_err();
        assert!(matches!(err, PrecipError::MissingVariable(_)));

        let name =
            resolve_with_override(VariableRole::ConvectiveAccumulation, None, |n| {
                present.contains(&n)
            })
            .unwrap();
        assert_eq!(name, "rainc");
    }

    #[test]
    fn test_every_role_has_aliases() {
        for (role, names) in ALIAS_TABLE {
            assert!(!names.is_empty(), "{role} has no aliases");
        }
    }
}
