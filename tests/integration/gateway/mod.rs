//! Gateway integration tests
//!
//! Multi-connection scenarios played through real sessions sharing one
//! registry, and the same gateway behind a real WebSocket upgrade.

mod scenario_test;
mod socket_test;
