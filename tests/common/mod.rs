//! Common test utilities and helpers
//!
//! - Test application with in-memory collaborators
//! - Authentication helpers
//! - A scripted gateway client driven over channels

pub mod auth_helpers;
pub mod gateway_client;

pub use auth_helpers::*;
pub use gateway_client::*;
