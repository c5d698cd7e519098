//! Error types used throughout the widget integration layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for FlowCal
///
/// Fatal conditions only. Local cache write failures and upstream push
/// failures are non-fatal by contract: they are logged and reflected in
/// `SaveOutcome`, never raised through this type.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum WidgetError {
    /// Non-success response from the task backend. Carries the HTTP status
    /// and the raw response body; never retried automatically.
    #[error("backend request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    /// Missing or unusable widget configuration at resolution time.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transport-level failure (connection refused, DNS, malformed URL).
    #[error("network error: {0}")]
    Network(String),

    /// Local persistence failure surfaced from a cache implementation.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Response body could not be parsed into the expected shape.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for FlowCal operations
pub type Result<T> = std::result::Result<T, WidgetError>;

impl WidgetError {
    /// Stable label for structured logging and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Request { .. } => "request",
            Self::Configuration(_) => "configuration",
            Self::Network(_) => "network",
            Self::Persistence(_) => "persistence",
            Self::Serialization(_) => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}
