//! Server Module
//!
//! Configuration, application state, and startup wiring.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Environment configuration, database pool
//! └── init.rs         - State building and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `GatewayConfig::from_env`
//! 2. **Collaborators**: PostgreSQL when reachable, in-memory otherwise
//! 3. **State Creation**: authenticator, gateway context
//! 4. **Router Creation**: routes and middleware

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{ConfigError, GatewayConfig};
pub use init::{build_state, create_app};
pub use state::AppState;
