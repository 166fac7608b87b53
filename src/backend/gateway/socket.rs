/**
 * WebSocket Transport
 *
 * `GET /ws` upgrade handler. The route sits behind the auth middleware, so an
 * unauthenticated request is rejected with 401 before any upgrade and before
 * any gateway state is touched.
 *
 * After the upgrade the socket is split:
 *
 * - a writer task drains the connection's bounded outbound channel into the
 *   socket sink and stops after the first `Close`. Once the session ends the
 *   writer gets a short grace period to flush, then it is aborted so a peer
 *   that stopped reading cannot pin the socket.
 * - the read half is mapped into `InboundFrame`s and handed to
 *   `ConnectionSession::run`
 */

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::backend::error::BackendError;
use crate::backend::gateway::registry::Outbound;
use crate::backend::gateway::session::{ConnectionSession, InboundFrame, SessionOutcome};
use crate::backend::gateway::GatewayContext;
use crate::backend::middleware::AuthUser;

/// Protocol limit on a close frame's reason, in bytes
const MAX_CLOSE_REASON: usize = 123;

const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(gateway): State<GatewayContext>,
    AuthUser(user): AuthUser,
) -> Response {
    tracing::debug!("[Gateway] Upgrade requested by {}", user.user_id);
    ws.on_upgrade(move |socket| serve_socket(socket, gateway, user.user_id))
}

async fn serve_socket(socket: WebSocket, gateway: GatewayContext, user_id: String) {
    let (sink, stream) = socket.split();
    let (handle, outbound) = gateway.open(&user_id);

    let writer = tokio::spawn(write_outbound(sink, outbound));

    let inbound = stream.map(|item| match item {
        Ok(WsMessage::Text(text)) => Ok(InboundFrame::Text(text.as_str().to_owned())),
        Ok(WsMessage::Binary(bytes)) => Ok(InboundFrame::Binary(bytes.to_vec())),
        Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => Ok(InboundFrame::Ping),
        Ok(WsMessage::Close(_)) => Ok(InboundFrame::Close),
        Err(e) => Err(BackendError::disconnect(e.to_string())),
    });

    match ConnectionSession::new(gateway, handle).run(inbound).await {
        SessionOutcome::Rejected(e) => {
            tracing::debug!("[Gateway] {} rejected during handshake: {}", user_id, e);
        }
        SessionOutcome::Finished { topic, .. } => {
            tracing::debug!("[Gateway] {} left {}", user_id, topic);
        }
    }

    finish_writer(&user_id, writer).await;
}

/// Wait for the writer to flush, aborting it after the grace period
///
/// Returns whether it finished on its own.
async fn finish_writer(user_id: &str, mut writer: JoinHandle<()>) -> bool {
    match tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await {
        Ok(_) => true,
        Err(_) => {
            tracing::warn!("[Gateway] Writer for {} did not drain in time, aborting", user_id);
            writer.abort();
            false
        }
    }
}

async fn write_outbound<S>(mut sink: S, mut outbound: mpsc::Receiver<Outbound>)
where
    S: futures_util::Sink<WsMessage> + Unpin,
{
    while let Some(item) = outbound.recv().await {
        match item {
            Outbound::Frame(text) => {
                if sink.send(WsMessage::Text(text.into())).await.is_err() {
                    break;
                }
            }
            Outbound::Close(reason) => {
                let frame = CloseFrame {
                    code: close_code::NORMAL,
                    reason: truncate_reason(&reason).into(),
                };
                let _ = sink.send(WsMessage::Close(Some(frame))).await;
                break;
            }
        }
    }
    let _ = sink.close().await;
}

fn truncate_reason(reason: &str) -> String {
    if reason.len() <= MAX_CLOSE_REASON {
        return reason.to_string();
    }
    let mut end = MAX_CLOSE_REASON;
    while !reason.is_char_boundary(end) {
        end -= 1;
    }
    reason[..end].to_string()
}
