//! Error types for the LLM layer

use thiserror::Error;

/// Errors that can occur when calling an LLM provider
#[derive(Debug, Error)]
pub enum LlmError {
    /// Client could not be constructed
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Transport failure or non-2xx status (status 0 when no response arrived)
    #[error("HTTP error (status {status}): {body}")]
    HttpError { status: u16, body: String },

    /// JSON encoding/decoding issues
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Response parsed but didn't contain a usable reply
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return LlmError::SerializationError(err.to_string());
        }

        LlmError::HttpError {
            status: err.status().map(|s| s.as_u16()).unwrap_or(0),
            body: err.to_string(),
        }
    }
}
