//! Collaborator Store Module
//!
//! The gateway depends on four services it does not own: the session store,
//! the thread-membership directory, message persistence, and the account
//! directory used by the login boundary. Each is a trait here so the gateway
//! can run against PostgreSQL in production and in-memory fakes in tests.
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs       - Collaborator traits and the `Collaborators` bundle
//! ├── memory.rs    - In-memory implementations
//! └── postgres.rs  - sqlx/PostgreSQL implementations
//! ```
//!
//! # Atomicity
//!
//! Implementations provide their own per-key atomicity. The gateway treats
//! every call as possibly remote and possibly failing; a failure is reported
//! as a `BackendError` and never corrupts gateway state.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::backend::error::BackendResult;
use crate::shared::Message;

/// In-memory collaborator implementations
pub mod memory;

/// PostgreSQL collaborator implementations
pub mod postgres;

pub use memory::{
    MemoryAccountDirectory, MemoryMembershipDirectory, MemoryMessageStore, MemorySessionStore,
};
pub use postgres::{PgAccountDirectory, PgMembershipDirectory, PgMessageStore};

/// Key/value store with per-record expiry
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Store `value` under `key`, replacing any previous record
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> BackendResult<()>;

    /// Read the live record for `key`, `None` if absent or expired
    async fn get(&self, key: &str) -> BackendResult<Option<String>>;

    /// Delete the record for `key`; returns whether one existed
    async fn delete(&self, key: &str) -> BackendResult<bool>;

    /// Drop every expired record, returning how many were removed
    async fn purge_expired(&self) -> BackendResult<usize>;
}

/// Purge expired sessions from `store` every `every`
///
/// The first purge runs one full interval after the call. The task runs
/// until it is aborted or the runtime shuts down.
pub fn spawn_session_sweeper(store: Arc<dyn SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(purged) => tracing::debug!("[Sessions] Purged {} expired session(s)", purged),
                Err(e) => tracing::warn!("[Sessions] Purge failed: {}", e),
            }
        }
    })
}

/// Thread membership lookup
#[async_trait]
pub trait MembershipDirectory: Send + Sync + 'static {
    /// Every user id that belongs to `thread_id`
    async fn list_members(&self, thread_id: &str) -> BackendResult<HashSet<String>>;

    async fn is_member(&self, thread_id: &str, user_id: &str) -> BackendResult<bool> {
        Ok(self.list_members(thread_id).await?.contains(user_id))
    }
}

/// Message persistence
#[async_trait]
pub trait MessageStore: Send + Sync + 'static {
    /// Persist a message; the store assigns its id and timestamp
    async fn create(
        &self,
        body: &str,
        grade: i32,
        author_id: &str,
        thread_id: &str,
    ) -> BackendResult<Message>;
}

/// Password check for the login boundary
#[async_trait]
pub trait AccountDirectory: Send + Sync + 'static {
    /// `Ok(false)` for an unknown user or a wrong password
    async fn verify_password(&self, user_id: &str, password: &str) -> BackendResult<bool>;
}

/// The set of collaborators the server is wired with
#[derive(Clone)]
pub struct Collaborators {
    pub sessions: Arc<dyn SessionStore>,
    pub members: Arc<dyn MembershipDirectory>,
    pub messages: Arc<dyn MessageStore>,
    pub accounts: Arc<dyn AccountDirectory>,
}

impl Collaborators {
    /// Everything in process memory (tests, or no `DATABASE_URL`)
    pub fn in_memory() -> Self {
        Self {
            sessions: Arc::new(MemorySessionStore::new()),
            members: Arc::new(MemoryMembershipDirectory::new()),
            messages: Arc::new(MemoryMessageStore::new()),
            accounts: Arc::new(MemoryAccountDirectory::new()),
        }
    }

    /// Threads, messages and accounts from PostgreSQL
    ///
    /// Sessions stay in process memory; restarting the server logs every
    /// user out.
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            sessions: Arc::new(MemorySessionStore::new()),
            members: Arc::new(PgMembershipDirectory::new(pool.clone())),
            messages: Arc::new(PgMessageStore::new(pool.clone())),
            accounts: Arc::new(PgAccountDirectory::new(pool)),
        }
    }
}
