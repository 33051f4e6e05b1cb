//! Error types for precip-spectra operations.

use thiserror::Error;

/// Result type alias using PrecipError.
pub type PrecipResult<T> = Result<T, PrecipError>;

/// Primary error type for field loading, normalization and spectral analysis.
#[derive(Debug, Error)]
pub enum PrecipError {
    // === Input Data Errors ===
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    #[error("Unrecognized precipitation units: {0}. Please set a proper 'units' attribute")]
    UnrecognizedUnit(String),

    #[error("Invalid time axis: {0}")]
    InvalidTime(String),

    #[error("Invalid NetCDF data: {0}")]
    NetCdf(String),

    // === Shape Errors ===
    #[error("Dimension error: {0}")]
    Dimension(String),

    #[error("Cannot trim {width} cells from each edge of a {rows}x{cols} field")]
    InvalidTrim {
        width: usize,
        rows: usize,
        cols: usize,
    },

    // === Parameter Errors ===
    #[error("Invalid output unit '{0}': expected 'mm/h' or 'mm/day'")]
    InvalidOutputUnit(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Output Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl PrecipError {
    /// Stable name of the error category, used as a structured log field.
    pub fn error_code(&self) -> &'static str {
        match self {
            PrecipError::MissingVariable(_) => "MissingVariableError",
            PrecipError::UnrecognizedUnit(_) => "UnrecognizedUnitError",
            PrecipError::InvalidTime(_) => "InvalidTimeError",
            PrecipError::NetCdf(_) => "NetCdfError",
            PrecipError::Dimension(_) => "DimensionError",
            PrecipError::InvalidTrim { .. } => "InvalidTrimError",
            PrecipError::InvalidOutputUnit(_) => "InvalidOutputUnitError",
            PrecipError::InvalidParameter { .. } => "InvalidParameterError",
            PrecipError::Render(_) => "RenderError",
            PrecipError::Io(_) => "IoError",
            PrecipError::InternalError(_) => "InternalError",
        }
    }

    /// Shorthand for an `InvalidParameter` error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        PrecipError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a `Dimension` error.
    pub fn dimension(message: impl Into<String>) -> Self {
        PrecipError::Dimension(message.into())
    }
}

impl From<serde_json::Error> for PrecipError {
    fn from(err: serde_json::Error) -> Self {
        PrecipError::InternalError(format!("JSON error: {}", err))
    }
}
