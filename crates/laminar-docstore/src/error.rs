//! Scheme adapter error types.
//!
//! Provides a unified error hierarchy for adapter operations:
//! - `SchemeError`: Top-level error for configuration, read and write paths
//! - `SerdeError`: Value reader/writer errors

use thiserror::Error;

/// Errors that can occur while configuring or running a split.
#[derive(Debug, Error)]
pub enum SchemeError {
    /// Invalid adapter or job configuration.
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// Required configuration key is missing.
    #[error("missing required config: {0}")]
    MissingConfig(String),

    /// The record cursor failed to produce the next record.
    #[error("read error: {0}")]
    ReadError(String),

    /// The collector failed to accept an outgoing tuple.
    #[error("write error: {0}")]
    WriteError(String),

    /// A lifecycle call arrived while the split was in the wrong state.
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// The expected state.
        expected: String,
        /// The actual state.
        actual: String,
    },

    /// Value serialization or deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] SerdeError),

    /// An I/O error from the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by value readers and writers.
#[derive(Debug, Error)]
pub enum SerdeError {
    /// JSON parsing or encoding error.
    #[error("JSON error: {0}")]
    Json(String),

    /// The input is well-formed but is not a document.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The tuple carries more values than there are resolved names.
    #[error("field count mismatch: {names} names, {values} values")]
    FieldCountMismatch {
        /// Number of resolved names.
        names: usize,
        /// Number of tuple values.
        values: usize,
    },
}

impl From<serde_json::Error> for SerdeError {
    fn from(e: serde_json::Error) -> Self {
        SerdeError::Json(e.to_string())
    }
}
