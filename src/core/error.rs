//! Error types for classifier training and inference

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid label id {label}: must be in [0, {num_classes})")]
    InvalidLabel { label: usize, num_classes: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Numeric error: {0}")]
    NumericError(String),

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Optimization failed: {0}")]
    OptimizationError(String),

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, ClassifyError>;
