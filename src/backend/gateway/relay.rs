/**
 * Message Relay
 *
 * Persists one chat message and fans it out to the members of its thread.
 *
 * # Steps
 *
 * 1. Persist through the `MessageStore`. On failure nothing is pushed to
 *    anyone and the caller gets `Persistence`.
 * 2. Build the outbound `message` envelope from the persisted record and
 *    encode it once.
 * 3. Load the thread's members fresh from the `MembershipDirectory`. The
 *    message is already stored at this point, so a directory failure is a
 *    delivery failure recorded in the report, not an error.
 * 4. Push the frame to every member with a registered connection, the
 *    author included. Members without a connection are skipped.
 * 5. A push failure for one member is logged and never stops delivery to
 *    the rest.
 */

use std::sync::Arc;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::gateway::registry::ConnectionRegistry;
use crate::backend::store::{MembershipDirectory, MessageStore};
use crate::shared::{ChatRequest, Envelope, MessagePayload};

/// Who a relayed message reached
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayReport {
    pub message_id: String,
    /// Members whose connection accepted the frame
    pub delivered: Vec<String>,
    /// Members with no live connection
    pub skipped: Vec<String>,
    /// Members whose push failed
    pub failed: Vec<String>,
    /// Why the persisted message reached nobody, when the members could not
    /// be resolved
    pub undelivered: Option<String>,
}

#[derive(Clone)]
pub struct MessageRelay {
    registry: ConnectionRegistry,
    members: Arc<dyn MembershipDirectory>,
    messages: Arc<dyn MessageStore>,
}

impl MessageRelay {
    pub fn new(
        registry: ConnectionRegistry,
        members: Arc<dyn MembershipDirectory>,
        messages: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            registry,
            members,
            messages,
        }
    }

    pub async fn relay(
        &self,
        author_id: &str,
        thread_id: &str,
        request: &ChatRequest,
    ) -> BackendResult<RelayReport> {
        if thread_id.is_empty() {
            return Err(BackendError::protocol("chat requires a thread"));
        }

        let message = self
            .messages
            .create(&request.message, request.grade, author_id, thread_id)
            .await
            .map_err(|e| match e {
                BackendError::Persistence { .. } => e,
                other => BackendError::persistence(other.message()),
            })?;

        let frame = Envelope::message(&MessagePayload::from(&message))?.encode()?;
        let members = match self.members.list_members(thread_id).await {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!(
                    "[Relay] {} saved but members of {} unavailable: {}",
                    message.id,
                    thread_id,
                    e
                );
                return Ok(RelayReport {
                    message_id: message.id,
                    undelivered: Some(e.message()),
                    ..RelayReport::default()
                });
            }
        };

        let fan_out = self.registry.fan_out(&members, &frame).await;
        for (user_id, err) in &fan_out.failed {
            tracing::warn!("[Relay] Push to {} failed: {}", user_id, err);
        }

        tracing::debug!(
            "[Relay] {} in {}: {} delivered, {} offline, {} failed",
            message.id,
            thread_id,
            fan_out.delivered.len(),
            fan_out.absent.len(),
            fan_out.failed.len()
        );

        let mut report = RelayReport {
            message_id: message.id,
            delivered: fan_out.delivered,
            skipped: fan_out.absent,
            failed: fan_out.failed.into_iter().map(|(user_id, _)| user_id).collect(),
            undelivered: None,
        };
        report.delivered.sort();
        report.skipped.sort();
        report.failed.sort();
        Ok(report)
    }
}
