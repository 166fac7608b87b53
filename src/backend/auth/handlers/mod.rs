//! Authentication Handlers Module
//!
//! HTTP handlers for the session boundary.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports
//! ├── types.rs    - Request and response types
//! ├── cookie.rs   - Session cookie headers
//! ├── login.rs    - POST /login
//! └── logout.rs   - DELETE /logout, POST /session/refresh
//! ```

/// Request and response types
pub mod types;

/// Session cookie headers
pub mod cookie;

/// Login handler
pub mod login;

/// Logout and refresh handlers
pub mod logout;

pub use login::login;
pub use logout::{logout, refresh};
pub use types::{LoginRequest, SessionResponse};
