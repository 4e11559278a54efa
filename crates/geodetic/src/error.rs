//! Error types for geodetic conversions.

use thiserror::Error;

/// Errors raised by the geodetic conversions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeodeticError {
    /// Latitude outside [-90, 90] degrees.
    #[error("invalid latitude {0} (degrees)")]
    InvalidLatitude(f64),

    /// The local frame is undefined at the poles.
    #[error("latitude {0} rad is at a pole, local frame is singular")]
    PoleCell(f64),

    /// The rotation matrix could not be inverted.
    #[error("singular rotation matrix at lat={lat} rad, lon={lon} rad")]
    SingularMatrix { lat: f64, lon: f64 },

    /// An input was NaN or infinite.
    #[error("non-finite input: {0}")]
    NonFinite(&'static str),
}

/// Result type for geodetic operations.
pub type Result<T> = std::result::Result<T, GeodeticError>;
