//! Real-time Gateway Module
//!
//! Long-lived bidirectional connections bound to a topic (a thread or the
//! global presence channel). Chat messages sent on a thread are persisted and
//! pushed to every connected member of that thread.
//!
//! # Module Structure
//!
//! ```text
//! gateway/
//! ├── mod.rs         - GatewayContext, the wiring shared by all connections
//! ├── registry.rs    - user id → live connection directory
//! ├── handshake.rs   - setup-frame state machine and membership policy
//! ├── relay.rs       - persist + fan-out of chat messages
//! ├── notice.rs      - system notices to one user
//! ├── disconnect.rs  - connection teardown
//! ├── session.rs     - per-connection driver (handshake → read loop → teardown)
//! └── socket.rs      - axum WebSocket upgrade and writer task
//! ```
//!
//! # Concurrency
//!
//! Each connection runs as its own task with its own writer task. The
//! `ConnectionRegistry` is the only state shared between connections.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::backend::server::config::GatewayConfig;
use crate::backend::store::{Collaborators, MembershipDirectory};

pub mod disconnect;
pub mod handshake;
pub mod notice;
pub mod registry;
pub mod relay;
pub mod session;
pub mod socket;

pub use handshake::{HandshakeState, MembershipPolicy, Topic};
pub use registry::{ConnectionHandle, ConnectionRegistry, Outbound};
pub use relay::{MessageRelay, RelayReport};
pub use session::{ConnectionSession, InboundFrame, SessionOutcome};

/// Everything a connection task needs, cheap to clone
#[derive(Clone)]
pub struct GatewayContext {
    pub registry: ConnectionRegistry,
    pub relay: MessageRelay,
    pub members: Arc<dyn MembershipDirectory>,
    pub policy: MembershipPolicy,
    pub handshake_timeout: Duration,
    pub outbound_buffer: usize,
}

impl GatewayContext {
    pub fn new(config: &GatewayConfig, collaborators: &Collaborators) -> Self {
        let registry = ConnectionRegistry::new();
        let relay = MessageRelay::new(
            registry.clone(),
            collaborators.members.clone(),
            collaborators.messages.clone(),
        );

        Self {
            registry,
            relay,
            members: collaborators.members.clone(),
            policy: config.membership_policy,
            handshake_timeout: config.handshake_timeout,
            outbound_buffer: config.outbound_buffer,
        }
    }

    /// A new handle for `user_id` with the configured outbound buffer
    pub fn open(&self, user_id: &str) -> (ConnectionHandle, mpsc::Receiver<Outbound>) {
        ConnectionHandle::new(user_id, self.outbound_buffer)
    }
}
