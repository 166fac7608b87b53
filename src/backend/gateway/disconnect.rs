/**
 * Disconnect Handler
 *
 * Tears one connection down: a best-effort close frame carrying the cause
 * (or the farewell text on a clean close), cancellation of the connection's
 * tasks, and release of its registry entry. Safe to run more than once and
 * safe to run for a connection that was displaced by a newer one; the
 * successor's entry is never touched.
 */

use crate::backend::error::BackendError;
use crate::backend::gateway::registry::{ConnectionHandle, ConnectionRegistry};

/// Close reason for a connection that ended without an error
pub const FAREWELL: &str = "websocket connection closed";

pub fn close_reason(cause: Option<&BackendError>) -> String {
    match cause {
        Some(err) => err.message(),
        None => FAREWELL.to_string(),
    }
}

/// Returns whether this call removed the registry entry
pub async fn disconnect(
    registry: &ConnectionRegistry,
    handle: &ConnectionHandle,
    cause: Option<&BackendError>,
) -> bool {
    match cause {
        Some(err) => tracing::info!("[Gateway] {} disconnected: {}", handle.user_id(), err),
        None => tracing::info!("[Gateway] {}: client disconnected", handle.user_id()),
    }

    handle.close(close_reason(cause));
    registry.release(handle).await
}
