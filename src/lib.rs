//! Threadline - Main Library
//!
//! Threadline is a real-time messaging gateway. Authenticated clients open a
//! WebSocket, bind it to a conversation thread (or to the global presence
//! channel) with a `setup` frame, and exchange chat messages that are
//! persisted and pushed to every connected member of the thread.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types shared with clients
//!   - The `{type, data}` envelope, chat requests, fan-out payloads
//!   - Error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Axum HTTP server, session authentication
//!   - Connection registry, handshake, relay, notices, disconnect handling
//!   - PostgreSQL and in-memory collaborators
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the backend and the server binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use threadline::backend::server::{create_app, GatewayConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GatewayConfig::from_env()?;
//! let app = create_app(config).await;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
