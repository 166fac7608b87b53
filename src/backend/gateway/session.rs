/**
 * Connection Session
 *
 * Drives one authenticated connection from its first frame to teardown.
 *
 * # Lifecycle
 *
 * 1. Wait (bounded by the handshake timeout) for the first text frame and
 *    run it through the handshake. A failure closes the connection before it
 *    is ever registered.
 * 2. Register the connection, replacing any earlier one for the same user.
 * 3. Send the welcome notice.
 * 4. Read frames until the peer closes, the socket errors, a frame breaks the
 *    protocol, or the connection is displaced by a newer one.
 * 5. Disconnect.
 *
 * # Frame Handling After Join
 *
 * - `message` on a thread: relayed. A relay failure, or a saved message that
 *   could not be delivered, is reported to this connection only and reading
 *   continues.
 * - `message` on the global topic: refused with a notice, reading continues.
 * - `setup` / `notice`: ignored.
 * - Anything that is not a valid envelope or chat payload: protocol error,
 *   the connection is closed.
 *
 * The session takes its input as a `Stream` so the socket layer stays a thin
 * adapter and the whole lifecycle can be driven from tests.
 */

use futures_util::{Stream, StreamExt};

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::gateway::disconnect::{close_reason, disconnect};
use crate::backend::gateway::handshake::{Handshake, Topic};
use crate::backend::gateway::notice::{notify, welcome_text, GLOBAL_CHAT_REFUSED};
use crate::backend::gateway::registry::ConnectionHandle;
use crate::backend::gateway::relay::RelayReport;
use crate::backend::gateway::GatewayContext;
use crate::shared::{Envelope, EnvelopeKind};

/// A frame read from the client, transport details stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
    /// Keep-alive traffic (ping/pong)
    Ping,
    Close,
}

/// How a session ended
#[derive(Debug)]
pub enum SessionOutcome {
    /// The handshake failed; the connection was never registered
    Rejected(BackendError),
    /// The connection joined `topic` and later ended, `cause` is `None` on a
    /// clean close or displacement
    Finished {
        topic: Topic,
        cause: Option<BackendError>,
    },
}

pub struct ConnectionSession {
    gateway: GatewayContext,
    handle: ConnectionHandle,
}

impl ConnectionSession {
    pub fn new(gateway: GatewayContext, handle: ConnectionHandle) -> Self {
        Self { gateway, handle }
    }

    pub async fn run<S>(self, inbound: S) -> SessionOutcome
    where
        S: Stream<Item = Result<InboundFrame, BackendError>>,
    {
        let mut inbound = std::pin::pin!(inbound);
        let user_id = self.handle.user_id().to_string();

        let mut handshake = Handshake::new();
        let joined = match handshake.begin() {
            Ok(()) => self.await_setup(&mut handshake, &mut inbound).await,
            Err(e) => Err(e),
        };

        let topic = match joined {
            Ok(topic) => topic,
            Err(e) => {
                handshake.close();
                tracing::warn!("[Gateway] Handshake failed for {}: {}", user_id, e);
                self.handle.close(close_reason(Some(&e)));
                return SessionOutcome::Rejected(e);
            }
        };

        self.gateway.registry.register(self.handle.clone()).await;
        tracing::info!("[Gateway] {} joined {}", user_id, topic);
        notify(&self.gateway.registry, &self.handle, welcome_text(&topic)).await;

        let cause = self.read_loop(&topic, &mut inbound).await;
        handshake.close();
        disconnect(&self.gateway.registry, &self.handle, cause.as_ref()).await;

        SessionOutcome::Finished { topic, cause }
    }

    async fn await_setup<T>(&self, handshake: &mut Handshake, inbound: &mut T) -> BackendResult<Topic>
    where
        T: Stream<Item = Result<InboundFrame, BackendError>> + Unpin,
    {
        let frame = tokio::time::timeout(self.gateway.handshake_timeout, next_text(inbound))
            .await
            .map_err(|_| BackendError::protocol("timed out waiting for setup"))??;

        handshake
            .accept(
                &frame,
                self.handle.user_id(),
                self.gateway.policy,
                self.gateway.members.as_ref(),
            )
            .await
    }

    async fn read_loop<T>(&self, topic: &Topic, inbound: &mut T) -> Option<BackendError>
    where
        T: Stream<Item = Result<InboundFrame, BackendError>> + Unpin,
    {
        loop {
            let item = tokio::select! {
                _ = self.handle.cancelled() => {
                    tracing::debug!("[Gateway] {} connection cancelled", self.handle.user_id());
                    return None;
                }
                item = inbound.next() => item,
            };

            let raw = match item {
                None | Some(Ok(InboundFrame::Close)) => return None,
                Some(Ok(InboundFrame::Ping)) => continue,
                Some(Ok(InboundFrame::Text(text))) => text,
                Some(Ok(InboundFrame::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(_) => return Some(BackendError::protocol("binary frame is not UTF-8")),
                },
                Some(Err(e)) => return Some(e),
            };

            if let Err(e) = self.handle_frame(topic, &raw).await {
                return Some(e);
            }
        }
    }

    async fn handle_frame(&self, topic: &Topic, raw: &str) -> BackendResult<()> {
        let envelope = Envelope::decode(raw).map_err(|e| BackendError::protocol(e.to_string()))?;

        match envelope.kind {
            EnvelopeKind::Message => {
                let request = envelope
                    .chat_request()
                    .map_err(|e| BackendError::protocol(e.to_string()))?;

                let Some(thread_id) = topic.thread_id() else {
                    self.notice_self(GLOBAL_CHAT_REFUSED);
                    return Ok(());
                };

                match self.gateway.relay.relay(self.handle.user_id(), thread_id, &request).await {
                    Ok(RelayReport {
                        undelivered: Some(reason),
                        ..
                    }) => {
                        self.notice_self(format!("message saved but not delivered: {}", reason));
                    }
                    Ok(report) => {
                        tracing::debug!(
                            "[Gateway] {} relayed {} to {} member(s)",
                            self.handle.user_id(),
                            report.message_id,
                            report.delivered.len()
                        );
                    }
                    Err(e) => {
                        tracing::warn!("[Gateway] Relay failed for {}: {}", self.handle.user_id(), e);
                        self.notice_self(format!("message not sent: {}", e.message()));
                    }
                }
                Ok(())
            }
            EnvelopeKind::Setup | EnvelopeKind::Notice => {
                tracing::debug!(
                    "[Gateway] Ignoring '{}' frame from {}",
                    envelope.kind.as_str(),
                    self.handle.user_id()
                );
                Ok(())
            }
        }
    }

    /// Notice to this connection only, never another connection of the user
    fn notice_self(&self, text: impl Into<String>) {
        if let Err(e) = self.handle.send_envelope(&Envelope::notice(text)) {
            tracing::warn!("[Gateway] Notice for {} failed: {}", self.handle.user_id(), e);
        }
    }
}

/// Next text frame, skipping keep-alives
async fn next_text<T>(inbound: &mut T) -> BackendResult<String>
where
    T: Stream<Item = Result<InboundFrame, BackendError>> + Unpin,
{
    loop {
        match inbound.next().await {
            Some(Ok(InboundFrame::Text(text))) => return Ok(text),
            Some(Ok(InboundFrame::Binary(bytes))) => {
                return String::from_utf8(bytes)
                    .map_err(|_| BackendError::protocol("binary frame is not UTF-8"));
            }
            Some(Ok(InboundFrame::Ping)) => continue,
            Some(Ok(InboundFrame::Close)) | None => {
                return Err(BackendError::disconnect("closed before setup"));
            }
            Some(Err(e)) => return Err(e),
        }
    }
}
