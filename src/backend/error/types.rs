/**
 * Backend Error Types
 *
 * This module defines the error type used throughout the server side:
 * HTTP handlers, the session authenticator, and the real-time gateway.
 *
 * # Error Categories
 *
 * ## Boundary Errors
 *
 * - `HandlerError` - Bad request bodies, missing fields
 * - `Authentication` - Bad, expired, or revoked credentials
 *
 * ## Gateway Errors
 *
 * - `Protocol` - First frame is not `setup`, or a frame is malformed
 * - `Persistence` - The message-persistence collaborator failed
 * - `Push` - Writing to one peer connection failed
 * - `Disconnect` - The underlying socket errored while reading
 *
 * ## Collaborator Errors
 *
 * - `Membership` - The membership directory could not be reached
 * - `Database` - A sqlx query failed
 *
 * Gateway errors are contained to the connection that raised them; none of
 * them is ever propagated to another connection's task.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use threadline::backend::error::BackendError;
///
/// let err = BackendError::authentication("token revoked");
/// assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
///
/// let err = BackendError::protocol("first frame must be 'setup'");
/// assert!(err.is_protocol());
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., missing fields, invalid request)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Credential could not be verified, has expired, or was revoked
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// A connection broke the handshake or framing rules
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// Message persistence failed; the relay for that frame is aborted
    #[error("Persistence error: {message}")]
    Persistence { message: String },

    /// Pushing a frame to one peer failed
    #[error("Push error for '{user_id}': {message}")]
    Push { user_id: String, message: String },

    /// The socket errored while reading
    #[error("Disconnect: {message}")]
    Disconnect { message: String },

    /// Membership directory failure
    #[error("Membership lookup error: {message}")]
    Membership { message: String },

    /// Shared error (from shared module)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl BackendError {
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    pub fn push(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Push {
            user_id: user_id.into(),
            message: message.into(),
        }
    }

    pub fn disconnect(message: impl Into<String>) -> Self {
        Self::Disconnect {
            message: message.into(),
        }
    }

    pub fn membership(message: impl Into<String>) -> Self {
        Self::Membership {
            message: message.into(),
        }
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `Authentication` - 401 Unauthorized
    /// - `Protocol` - 400 Bad Request
    /// - `Membership` - 503 Service Unavailable
    /// - `SharedError` - 400 for kind errors, 500 for serialization
    /// - Everything else - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Authentication { .. } => StatusCode::UNAUTHORIZED,
            Self::Protocol { .. } => StatusCode::BAD_REQUEST,
            Self::Membership { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::MessageError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::Persistence { .. }
            | Self::Push { .. }
            | Self::Disconnect { .. }
            | Self::SerializationError(_)
            | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error message without the category prefix
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. }
            | Self::Authentication { message }
            | Self::Protocol { message }
            | Self::Persistence { message }
            | Self::Push { message, .. }
            | Self::Disconnect { message }
            | Self::Membership { message } => message.clone(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
            Self::Database(err) => err.to_string(),
        }
    }
}
