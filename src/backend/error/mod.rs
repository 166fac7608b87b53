//! Backend Error Module
//!
//! Error types for the server side. HTTP handlers return them directly; the
//! gateway uses them to classify per-connection failures.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;

/// Result alias used across the backend
pub type BackendResult<T> = Result<T, BackendError>;
