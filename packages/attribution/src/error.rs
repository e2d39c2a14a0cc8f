//! Typed errors for the attribution library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur during attribution operations.
#[derive(Debug, Error)]
pub enum AttributionError {
    /// A single retrieval call failed (transport error, non-2xx status, timeout)
    #[error("retrieval error: {0}")]
    Retrieval(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Both retrieval modes failed for one query; no answer is available
    #[error("retrieval unavailable (vector: {vector}; graph: {graph})")]
    RetrievalUnavailable { vector: String, graph: String },

    /// Segment store operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// Invalid query provided
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for attribution operations.
pub type Result<T> = std::result::Result<T, AttributionError>;
