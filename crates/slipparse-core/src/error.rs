//! Error types for the slipparse-core library.

use thiserror::Error;

/// Main error type for the slipparse library.
///
/// Extraction gaps ("field X was not found in the OCR text") are never
/// errors; they surface as `None` fields on the result. The variants here
/// cover caller mistakes and I/O at the edges.
#[derive(Error, Debug)]
pub enum SlipError {
    /// The caller supplied a template key the dispatcher does not know.
    /// This is a configuration mistake, not a data-quality issue.
    #[error("unknown template key: {0}")]
    UnknownTemplate(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the slipparse library.
pub type Result<T> = std::result::Result<T, SlipError>;
