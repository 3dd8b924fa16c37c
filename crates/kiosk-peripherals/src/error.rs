//! Error types for calls across the host runtime boundary.
//!
//! These errors cover transport failures (the runtime went away, a call timed
//! out), malformed event payloads and failed liveness checks. None of them is
//! fatal to the orchestration layer, which logs them and carries on.

/// Result type alias for peripheral operations.
pub type Result<T> = std::result::Result<T, PeripheralError>;

/// Errors that can occur while talking to the host runtime or its services.
#[derive(Debug, thiserror::Error)]
pub enum PeripheralError {
    /// The runtime or one of its services is no longer reachable.
    #[error("Runtime disconnected: {source_name}")]
    Disconnected { source_name: String },

    /// Operation timed out after specified duration.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// The runtime refused or failed a call.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Event payload does not match the expected shape.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Event name outside the known vocabulary.
    #[error("Unknown event: {name}")]
    UnknownEvent { name: String },

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decoding failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl PeripheralError {
    /// Create a new disconnected error.
    pub fn disconnected(source_name: impl Into<String>) -> Self {
        Self::Disconnected {
            source_name: source_name.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new unknown event error.
    pub fn unknown_event(name: impl Into<String>) -> Self {
        Self::UnknownEvent { name: name.into() }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}
