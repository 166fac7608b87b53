/**
 * Connection Registry
 *
 * The shared directory from user id to the live connection handle. It is the
 * only mutable state shared between connection tasks, and every operation
 * (register, lookup, remove, release, push, fan-out) runs under one
 * `tokio::sync::Mutex`, so they are linearizable with respect to each other.
 *
 * Connection tasks never hold each other's handles: all pushes to a peer go
 * through `push` or `fan_out`, which resolve the peer under the lock and
 * enqueue without awaiting. A slow peer therefore cannot stall the registry.
 *
 * # Replacement Policy
 *
 * At most one connection per user. Registering a second connection for the
 * same user replaces the first and actively closes it: the displaced handle
 * gets a close frame and its cancellation token fires, which ends the
 * displaced connection's read loop. Pushes issued after `register` returns
 * only ever reach the new connection.
 */

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::shared::Envelope;

/// Reason sent to a connection displaced by a newer one
pub const REPLACED_REASON: &str = "replaced by a newer connection";

/// Frames queued for a connection's writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// An encoded envelope
    Frame(String),
    /// Close the socket with this reason; the writer stops after it
    Close(String),
}

/// Cloneable handle to one live connection
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: Uuid,
    user_id: String,
    tx: mpsc::Sender<Outbound>,
    cancel: CancellationToken,
}

impl ConnectionHandle {
    /// Create a handle and the receiving end its writer task drains
    pub fn new(user_id: impl Into<String>, capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            tx,
            cancel: CancellationToken::new(),
        };
        (handle, rx)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Enqueue an already-encoded frame without waiting
    ///
    /// Fails with `Push` when the connection is closed or its outbound buffer
    /// is full.
    pub fn send_frame(&self, frame: &str) -> BackendResult<()> {
        if self.cancel.is_cancelled() {
            return Err(BackendError::push(&self.user_id, "connection closed"));
        }
        self.tx
            .try_send(Outbound::Frame(frame.to_string()))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    BackendError::push(&self.user_id, "outbound buffer full")
                }
                mpsc::error::TrySendError::Closed(_) => {
                    BackendError::push(&self.user_id, "connection closed")
                }
            })
    }

    pub fn send_envelope(&self, envelope: &Envelope) -> BackendResult<()> {
        let frame = envelope.encode()?;
        self.send_frame(&frame)
    }

    /// Queue a close frame and cancel the connection; best effort, repeatable
    pub fn close(&self, reason: impl Into<String>) {
        if !self.cancel.is_cancelled() {
            let _ = self.tx.try_send(Outbound::Close(reason.into()));
        }
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the connection has been closed or displaced
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }
}

/// Outcome of pushing one frame to a set of users
#[derive(Debug, Default)]
pub struct FanOut {
    /// Users whose connection accepted the frame
    pub delivered: Vec<String>,
    /// Users with no registered connection
    pub absent: Vec<String>,
    /// Users whose connection rejected the frame
    pub failed: Vec<(String, BackendError)>,
}

/// Shared user id → connection directory
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<Mutex<HashMap<String, ConnectionHandle>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for the handle's user
    ///
    /// Returns the displaced handle, which has already been closed.
    pub async fn register(&self, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let user_id = handle.user_id.clone();
        let new_id = handle.id;
        let displaced = self.connections.lock().await.insert(user_id.clone(), handle);

        match displaced {
            Some(old) if old.id != new_id => {
                tracing::info!("[Gateway] {} reconnected, closing previous connection", user_id);
                old.close(REPLACED_REASON);
                Some(old)
            }
            _ => None,
        }
    }

    pub async fn lookup(&self, user_id: &str) -> Option<ConnectionHandle> {
        self.connections.lock().await.get(user_id).cloned()
    }

    /// Delete the entry for `user_id`; a no-op when absent
    pub async fn remove(&self, user_id: &str) -> Option<ConnectionHandle> {
        self.connections.lock().await.remove(user_id)
    }

    /// Delete the entry only if it still belongs to `handle`
    ///
    /// A displaced connection's cleanup must not evict its successor.
    pub async fn release(&self, handle: &ConnectionHandle) -> bool {
        let mut connections = self.connections.lock().await;
        match connections.get(&handle.user_id) {
            Some(current) if current.id == handle.id => {
                connections.remove(&handle.user_id);
                true
            }
            _ => false,
        }
    }

    /// Push one envelope to `handle`'s user if `handle` is still its entry
    ///
    /// `Ok(false)` when the user has no connection or a newer connection has
    /// replaced `handle`.
    pub async fn push(&self, handle: &ConnectionHandle, envelope: &Envelope) -> BackendResult<bool> {
        let frame = envelope.encode()?;
        let connections = self.connections.lock().await;
        match connections.get(&handle.user_id) {
            Some(current) if current.id == handle.id => current.send_frame(&frame).map(|_| true),
            _ => Ok(false),
        }
    }

    /// Push one encoded frame to every registered user in `user_ids`
    ///
    /// Resolution and enqueueing happen under a single lock acquisition.
    /// A failure for one user never stops delivery to the rest.
    pub async fn fan_out<'a, I>(&self, user_ids: I, frame: &str) -> FanOut
    where
        I: IntoIterator<Item = &'a String>,
    {
        let connections = self.connections.lock().await;
        let mut result = FanOut::default();

        for user_id in user_ids {
            match connections.get(user_id) {
                Some(handle) => match handle.send_frame(frame) {
                    Ok(()) => result.delivered.push(user_id.clone()),
                    Err(e) => result.failed.push((user_id.clone(), e)),
                },
                None => result.absent.push(user_id.clone()),
            }
        }

        result
    }

    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }

    pub async fn connected_users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.connections.lock().await.keys().cloned().collect();
        users.sort();
        users
    }
}
