//! Error types for the eventscore-core library.
//!
//! Matching and statistics never fail; errors come from the I/O layers around
//! them (annotation files, artifacts, configuration, probing, logging).

use std::path::Path;
use thiserror::Error;

/// Custom error types for eventscore
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid timestamp: {0}")]
    Timestamp(String),

    #[error("Subtitle parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Video probe failed: {0}")]
    Probe(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("No analyses found in {0}")]
    NoAnalysesFound(String),

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for eventscore operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Wraps an IO error with the path it happened on.
pub fn io_error_at(path: &Path, err: std::io::Error) -> CoreError {
    CoreError::PathError(format!("{}: {}", path.display(), err))
}
