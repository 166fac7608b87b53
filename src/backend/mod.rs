//! Backend Module
//!
//! Server-side code for the Threadline gateway: an Axum HTTP server that
//! issues sessions and upgrades authenticated clients to long-lived
//! WebSocket connections bound to a conversation thread.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, startup wiring
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`auth`** - Session tokens, revocation, login/logout handlers
//! - **`middleware`** - Session authentication for protected routes
//! - **`gateway`** - Connection registry, handshake, relay, notices, teardown
//! - **`store`** - Collaborator traits with PostgreSQL and in-memory backends
//! - **`error`** - Backend error type and HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Config, state, init
//! ├── routes/         - Route configuration
//! ├── auth/           - Sessions and handlers
//! ├── middleware/     - Request middleware
//! ├── gateway/        - Real-time core
//! ├── store/          - Collaborators
//! └── error/          - Error types
//! ```
//!
//! # Concurrency
//!
//! Every connection is served by its own reader task and writer task. The
//! connection registry is the only state shared between them and is guarded
//! by a single async mutex; collaborators are shared behind `Arc<dyn _>`.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and session management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Real-time gateway
pub mod gateway;

/// Collaborator stores
pub mod store;

pub use error::{BackendError, BackendResult};
pub use server::{create_app, AppState, GatewayConfig};
