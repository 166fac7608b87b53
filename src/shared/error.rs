//! Shared Error Types
//!
//! Errors raised while building or decoding wire types. The backend wraps
//! them into `BackendError`; a decode failure on an inbound frame becomes a
//! protocol violation there.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON encode/decode failures (malformed frames)
//! - `MessageError` - An envelope of the wrong kind was handed to a decoder
//!
//! # Usage
//!
//! ```rust
//! use threadline::shared::error::SharedError;
//!
//! let error = SharedError::message("expected a 'message' envelope");
//! assert!(error.to_string().contains("'message' envelope"));
//! ```
use thiserror::Error;

/// Errors produced by the shared wire types
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Envelope kind mismatch
    #[error("Message error: {message}")]
    MessageError {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::MessageError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
