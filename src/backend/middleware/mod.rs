//! Middleware Module
//!
//! HTTP middleware applied in front of handlers.
//!
//! - **`auth`** - Session authentication for protected routes
//!
//! # Example
//!
//! ```rust,ignore
//! use axum::middleware::from_fn_with_state;
//! use threadline::backend::middleware::auth_middleware;
//!
//! let protected = Router::new()
//!     .route("/logout", delete(logout))
//!     .layer(from_fn_with_state(state.clone(), auth_middleware));
//! ```

pub mod auth;

pub use auth::{auth_middleware, extract_token, AuthUser, AuthenticatedUser};
