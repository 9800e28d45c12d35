//! Error types for meshmask

use thiserror::Error;

/// Main error type for meshmask operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Mask is not readable: {0}")]
    UnreadableMask(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Computation was cancelled")]
    Cancelled,

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// Result type alias for meshmask operations
pub type Result<T> = std::result::Result<T, Error>;
