/**
 * In-Memory Collaborators
 *
 * Process-local implementations of the collaborator traits. The server uses
 * them when no database is configured, and every test uses them.
 *
 * Expiry in `MemorySessionStore` is measured with `tokio::time::Instant`, so
 * tests running on a paused clock can advance past a session's TTL.
 */

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::{AccountDirectory, MembershipDirectory, MessageStore, SessionStore};
use crate::shared::Message;

/// bcrypt cost for in-memory accounts; the minimum the crate accepts
const MEMORY_HASH_COST: u32 = 4;

struct SessionRecord {
    value: String,
    expires_at: Instant,
}

/// TTL key/value store
#[derive(Default)]
pub struct MemorySessionStore {
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> BackendResult<()> {
        let record = SessionRecord {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.records.write().await.insert(key.to_string(), record);
        Ok(())
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let now = Instant::now();
        {
            let records = self.records.read().await;
            match records.get(key) {
                None => return Ok(None),
                Some(record) if record.expires_at > now => return Ok(Some(record.value.clone())),
                Some(_) => {}
            }
        }
        // Expired: purge lazily. Re-check under the write lock in case a
        // fresh record replaced it in between.
        let mut records = self.records.write().await;
        if records.get(key).is_some_and(|record| record.expires_at <= now) {
            records.remove(key);
        }
        Ok(None)
    }

    async fn delete(&self, key: &str) -> BackendResult<bool> {
        Ok(self.records.write().await.remove(key).is_some())
    }

    async fn purge_expired(&self) -> BackendResult<usize> {
        let now = Instant::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| record.expires_at > now);
        Ok(before - records.len())
    }
}

/// Thread id → member set
///
/// `set_failing(true)` makes `list_members` fail, standing in for an
/// unreachable directory.
#[derive(Default)]
pub struct MemoryMembershipDirectory {
    threads: RwLock<HashMap<String, HashSet<String>>>,
    failing: AtomicBool,
}

impl MemoryMembershipDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn add_member(&self, thread_id: &str, user_id: &str) {
        self.threads
            .write()
            .await
            .entry(thread_id.to_string())
            .or_default()
            .insert(user_id.to_string());
    }

    pub async fn remove_member(&self, thread_id: &str, user_id: &str) -> bool {
        let mut threads = self.threads.write().await;
        match threads.get_mut(thread_id) {
            Some(members) => members.remove(user_id),
            None => false,
        }
    }
}

#[async_trait]
impl MembershipDirectory for MemoryMembershipDirectory {
    async fn list_members(&self, thread_id: &str) -> BackendResult<HashSet<String>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::membership("membership directory unavailable"));
        }
        Ok(self
            .threads
            .read()
            .await
            .get(thread_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Append-only message log
///
/// `set_failing(true)` makes every subsequent `create` fail, which is how
/// tests exercise the persistence-failure path of the relay.
#[derive(Default)]
pub struct MemoryMessageStore {
    messages: Mutex<Vec<Message>>,
    failing: AtomicBool,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.messages.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.messages.lock().await.len()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn create(
        &self,
        body: &str,
        grade: i32,
        author_id: &str,
        thread_id: &str,
    ) -> BackendResult<Message> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BackendError::persistence("message store unavailable"));
        }
        let message = Message::new(
            uuid::Uuid::new_v4().to_string(),
            author_id,
            thread_id,
            grade,
            body,
        );
        self.messages.lock().await.push(message.clone());
        Ok(message)
    }
}

/// User id → bcrypt hash
#[derive(Default)]
pub struct MemoryAccountDirectory {
    accounts: RwLock<HashMap<String, String>>,
}

impl MemoryAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an account with a plaintext password
    pub async fn insert(&self, user_id: &str, password: &str) -> BackendResult<()> {
        let hash = bcrypt::hash(password, MEMORY_HASH_COST)
            .map_err(|e| BackendError::persistence(format!("failed to hash password: {}", e)))?;
        self.accounts.write().await.insert(user_id.to_string(), hash);
        Ok(())
    }
}

#[async_trait]
impl AccountDirectory for MemoryAccountDirectory {
    async fn verify_password(&self, user_id: &str, password: &str) -> BackendResult<bool> {
        let hash = match self.accounts.read().await.get(user_id) {
            Some(hash) => hash.clone(),
            None => return Ok(false),
        };
        bcrypt::verify(password, &hash)
            .map_err(|e| BackendError::persistence(format!("password verification failed: {}", e)))
    }
}
