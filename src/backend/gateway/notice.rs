//! Notice Broadcaster
//!
//! System notices are `notice` envelopes pushed to one user's connection.
//! A notice addressed to a connection that is no longer the user's registry
//! entry is dropped rather than handed to its successor. Delivery is best
//! effort: an offline user or a failed push is logged, never raised.

use crate::backend::gateway::handshake::Topic;
use crate::backend::gateway::registry::{ConnectionHandle, ConnectionRegistry};
use crate::shared::Envelope;

/// Sent to a global connection that tries to chat
pub const GLOBAL_CHAT_REFUSED: &str = "join a thread to send messages";

/// Welcome text for a freshly joined connection
pub fn welcome_text(topic: &Topic) -> String {
    match topic {
        Topic::Global => "Web Socket Connected".to_string(),
        Topic::Thread(id) => format!("Web Socket Connected (room: {})", id),
    }
}

/// Push a notice to the user behind `target`; true when it was queued
pub async fn notify(
    registry: &ConnectionRegistry,
    target: &ConnectionHandle,
    text: impl Into<String>,
) -> bool {
    let user_id = target.user_id();
    match registry.push(target, &Envelope::notice(text)).await {
        Ok(true) => true,
        Ok(false) => {
            tracing::debug!("[Gateway] Notice for {} dropped, connection not registered", user_id);
            false
        }
        Err(e) => {
            tracing::warn!("[Gateway] Notice for {} failed: {}", user_id, e);
            false
        }
    }
}
