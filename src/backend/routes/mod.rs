//! Route Configuration Module
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs             - Module exports and documentation
//! ├── router.rs          - Main router creation
//! ├── api_routes.rs      - /ping, /login, /logout, /session/refresh
//! └── gateway_routes.rs  - /ws, /gateway/stats
//! ```
//!
//! Protected routes carry `auth_middleware` as a route layer, so a request
//! without a valid session never reaches the handler.

/// Main router creation
pub mod router;

/// Session endpoints
pub mod api_routes;

/// Gateway endpoints
pub mod gateway_routes;

pub use router::create_router;
