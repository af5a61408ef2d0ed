//! Error types for channel permutation

use thiserror::Error;

/// Permutation errors
#[derive(Debug, Error)]
pub enum PermutationError {
    /// Abstract operation invoked on a strategy that does not provide it
    #[error("Not implemented: {0} must be provided by the concrete strategy")]
    NotImplemented(&'static str),

    /// Shape mismatch
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    /// Dimension index beyond the tensor rank
    #[error("Dimension {dim} out of range for tensor of rank {ndim}")]
    DimOutOfRange { dim: usize, ndim: usize },

    /// Ordering is not a bijection of the indices
    #[error("Invalid permutation: {0}")]
    InvalidPermutation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PermutationError {
    /// Get error category for logs.
    pub fn category(&self) -> &'static str {
        match self {
            PermutationError::NotImplemented(_) => "not_implemented",
            PermutationError::ShapeMismatch { .. } => "shape_mismatch",
            PermutationError::DimOutOfRange { .. } => "dim_out_of_range",
            PermutationError::InvalidPermutation(_) => "invalid_permutation",
            PermutationError::ConfigError(_) => "config_error",
        }
    }
}

/// Result type for permutation operations
pub type Result<T> = std::result::Result<T, PermutationError>;
