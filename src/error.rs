//! Error types for ticker report generation.
//!
//! Clean error handling using `thiserror` for ergonomic error definitions.

use thiserror::Error;

/// Result type alias for report-generation operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Main error type for report-generation operations.
#[derive(Error, Debug, Clone)]
pub enum ReportError {
    /// A required numeric field failed to parse.
    ///
    /// Only the P/E ratio has a documented missing case; every other numeric
    /// field is assumed present and well-formed, so a failure here is fatal
    /// for the ingest call that produced it.
    #[error("Malformed numeric field `{field}`: {value:?}")]
    MalformedField {
        /// Schema name of the field that failed to parse
        field: &'static str,
        /// The offending token
        value: String,
    },

    /// A quote line carried fewer fields than the record schema requires.
    #[error("Truncated record: expected at least {expected} fields, got {actual}")]
    TruncatedRecord { expected: usize, actual: usize },

    /// A report sink failed to append a flushed group.
    ///
    /// Fatal for that aggregator's remaining output; never retried.
    #[error("Sink write failed for {path}: {detail}")]
    SinkWrite { path: String, detail: String },

    /// Generic error with context
    #[error("Error: {0}")]
    Generic(String),
}

impl ReportError {
    /// Create a generic error from any string-like type.
    pub fn generic(msg: impl Into<String>) -> Self {
        ReportError::Generic(msg.into())
    }
}

// Implement From for common error types for ergonomic error handling
impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Generic(format!("IO error: {err}"))
    }
}

impl From<String> for ReportError {
    fn from(err: String) -> Self {
        ReportError::Generic(err)
    }
}

impl From<&str> for ReportError {
    fn from(err: &str) -> Self {
        ReportError::Generic(err.to_string())
    }
}
