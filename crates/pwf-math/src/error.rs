//! Error types for matrix persistence.

use thiserror::Error;

/// Errors from matrix serialization and `.mat` export/import.
///
/// Any underlying stream or file failure surfaces as [`MatrixError::Io`];
/// structurally invalid payloads (bad magic, inconsistent offsets) surface
/// as [`MatrixError::Corrupt`]. Neither is ever silently ignored.
#[derive(Debug, Error)]
pub enum MatrixError {
    /// Underlying stream/file failure (truncated stream, directory path,
    /// closed handle).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was readable but does not describe a valid matrix.
    #[error("corrupt matrix data: {0}")]
    Corrupt(String),
}

/// Result type alias for matrix persistence operations.
pub type MatrixResult<T> = Result<T, MatrixError>;
