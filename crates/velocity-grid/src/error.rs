//! Error types for velocity grid processing.

use geodetic::GeodeticError;
use thiserror::Error;

/// Errors that can occur while loading, realigning or exporting grids.
#[derive(Error, Debug)]
pub enum VelocityGridError {
    /// Grid extent or step values are unusable.
    #[error("invalid grid metadata: {0}")]
    InvalidMetadata(String),

    /// A layer does not have the shape its extent implies.
    #[error("{layer} layer has shape {actual:?}, expected {expected:?} (rows, cols)")]
    ShapeMismatch {
        layer: String,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Structurally broken input file.
    #[error("malformed grid file: {0}")]
    Malformed(String),

    /// A token in a text grid could not be parsed.
    #[error("parse error at token {index}: {message}")]
    Parse { index: usize, message: String },

    /// A cell failed numerically; the whole run is aborted.
    #[error("cell (row={row}, col={col}) failed: {source}")]
    CellFailed {
        row: usize,
        col: usize,
        #[source]
        source: GeodeticError,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML configuration could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON report could not be produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VelocityGridError {
    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create a Malformed error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(
        layer: impl Into<String>,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        Self::ShapeMismatch {
            layer: layer.into(),
            expected,
            actual,
        }
    }
}

/// Result type for velocity grid operations.
pub type Result<T> = std::result::Result<T, VelocityGridError>;
