//! Error types for model parsing and validation.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while decoding wire documents into model types.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed interval at index {index}: start={start}, end={end}")]
    MalformedInterval { index: usize, start: f64, end: f64 },
}

impl ModelError {
    /// Create a malformed interval error.
    pub fn malformed(index: usize, start: f64, end: f64) -> Self {
        Self::MalformedInterval { index, start, end }
    }
}
