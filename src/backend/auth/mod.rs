//! Authentication Module
//!
//! Session tokens, revocation, and the HTTP boundary that issues them.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs            - Module exports and documentation
//! ├── sessions.rs       - JWT signing and verification
//! ├── authenticator.rs  - Session authenticator (token ↔ session store)
//! └── handlers/         - login, logout, refresh
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Login**: user id and password verified → token minted and put on
//!    record → token returned in the body and the session cookie
//! 2. **Authenticate**: every protected request (including the gateway
//!    upgrade) resolves its token to a user id; a token is trusted only while
//!    it is the one on record for its user
//! 3. **Logout**: the record is deleted, every token of the user stops working
//! 4. **Refresh**: logout and login in one step
//!
//! # Security
//!
//! - Passwords are verified with bcrypt by the account directory
//! - Tokens are HS256 JWTs; expiry is checked with zero leeway
//! - Unknown user and wrong password return the same 401

/// JWT token generation and validation
pub mod sessions;

/// Session authenticator
pub mod authenticator;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use authenticator::{Session, SessionAuthenticator};
pub use handlers::{login, logout, refresh, LoginRequest, SessionResponse};
pub use sessions::{Claims, TokenSigner};
