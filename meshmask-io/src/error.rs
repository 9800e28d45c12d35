//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Write error: {message}")]
    WriteError { message: String },
}

impl From<IoError> for meshmask_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::InvalidFormat { .. } => meshmask_core::Error::Image(err.to_string()),
            IoError::ParseError { .. } | IoError::WriteError { .. } => {
                meshmask_core::Error::Serialization(err.to_string())
            }
            IoError::FileNotFound { .. } => meshmask_core::Error::InvalidData(err.to_string()),
        }
    }
}
