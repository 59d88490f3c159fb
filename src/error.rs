//! Error types for coinrec.

use thiserror::Error;

/// Errors that can occur when building or querying the engines.
///
/// All error conditions are terminal for the call that triggered them and
/// leave the index/model state intact for subsequent calls.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Invalid configuration value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// Dimension mismatch between a point and the structure it was offered to.
    #[error("dimension mismatch: point has {point_dim} dimensions, expected {expected_dim}")]
    DimensionMismatch {
        point_dim: usize,
        expected_dim: usize,
    },
    /// A delimited point line could not be parsed.
    #[error("invalid point line: {0}")]
    InvalidPoint(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
