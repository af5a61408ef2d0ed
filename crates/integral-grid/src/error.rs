//! Error types for grid operations

use thiserror::Error;

/// Grid and distribution errors
#[derive(Debug, Error)]
pub enum GridError {
    /// Abstract operation invoked on a type that does not provide it
    #[error("Not implemented: {0} must be provided by the concrete type")]
    NotImplemented(&'static str),

    /// Distribution bounds are degenerate
    #[error("Invalid distribution: min_val {min_val} and max_val {max_val} must satisfy 1 <= min_val <= max_val")]
    InvalidDistribution { min_val: usize, max_val: usize },

    /// Grid size is outside what the grid can represent
    #[error("Invalid grid size: {0}")]
    InvalidSize(String),

    /// Axis key not present in a composite grid
    #[error("Unknown axis: {0}")]
    UnknownAxis(String),

    /// Axis key registered twice in a composite grid
    #[error("Duplicate axis: {0}")]
    DuplicateAxis(String),

    /// Operation not supported by this grid variant
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Parameter (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GridError {
    /// Create an invalid size error.
    pub fn invalid_size(message: impl Into<String>) -> Self {
        GridError::InvalidSize(message.into())
    }

    /// Get error category for logs.
    pub fn category(&self) -> &'static str {
        match self {
            GridError::NotImplemented(_) => "not_implemented",
            GridError::InvalidDistribution { .. } => "invalid_distribution",
            GridError::InvalidSize(_) => "invalid_size",
            GridError::UnknownAxis(_) => "unknown_axis",
            GridError::DuplicateAxis(_) => "duplicate_axis",
            GridError::Unsupported(_) => "unsupported",
            GridError::Serialization(_) => "serialization",
        }
    }
}

impl From<bincode::Error> for GridError {
    fn from(e: bincode::Error) -> Self {
        GridError::Serialization(e.to_string())
    }
}

/// Result type for grid operations
pub type Result<T> = std::result::Result<T, GridError>;
