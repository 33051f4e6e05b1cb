//! Error types for NetCDF reading and writing.

use precip_common::PrecipError;
use thiserror::Error;

/// Result type for NetCDF I/O operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF I/O.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// The file could not be opened or created
    #[error("Failed to open {path}: {message}")]
    Open { path: String, message: String },

    /// Missing required variable, dimension or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetCdfError {
    pub fn open_failed(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        NetCdfError::Open {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    pub fn invalid_format(context: &str, err: impl std::fmt::Display) -> Self {
        NetCdfError::InvalidFormat(format!("{}: {}", context, err))
    }
}

impl From<NetCdfError> for PrecipError {
    fn from(err: NetCdfError) -> Self {
        match err {
            NetCdfError::MissingData(msg) => PrecipError::MissingVariable(msg),
            NetCdfError::Io(e) => PrecipError::Io(e),
            other => PrecipError::NetCdf(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_maps_to_missing_variable() {
        let err: PrecipError = NetCdfError::MissingData("rainc".into()).into();
        assert!(matches!(err, PrecipError::MissingVariable(_)));
    }

    #[test]
    fn test_open_failure_maps_to_netcdf() {
        let err: PrecipError = NetCdfError::open_failed("a.nc", "No such file").into();
        assert_eq!(err.error_code(), "NetCdfError");
        assert!(err.to_string().contains("a.nc"));
    }
}
