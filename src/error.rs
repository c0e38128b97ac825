//! Error types for the mood engine.
//!
//! The engine is pure computation, so every variant is a local validation
//! failure. Zero-range and zero-variance columns are not errors: they fall
//! back to constant zero (see [`crate::features`] and [`crate::standardize`]).

use thiserror::Error;

/// Errors raised by catalog loading and engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Catalog has no columns overlapping the canonical feature set (found: {found:?})")]
    Schema { found: Vec<String> },

    #[error("Catalog contains no rows")]
    EmptyCatalog,

    #[error("Index {index} is out of range for a catalog of {len} items")]
    InvalidIndex { index: usize, len: usize },

    #[error("Row {row}: column `{column}` has non-numeric value `{value}`")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Vector has {actual} dimensions, the catalog matrix has {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the engine
pub type Result<T> = std::result::Result<T, EngineError>;
