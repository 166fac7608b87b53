/**
 * Session Authenticator
 *
 * Combines the token signer with the revocable session store.
 *
 * # Record Layout
 *
 * One record per user: `session:<user_id>` → `<token>`, with a TTL equal to
 * the token's remaining lifetime. A token is trusted only while it is the
 * value on record for the user named in its `sub` claim, so:
 *
 * - `logout(u)` deletes the slot and every token ever issued to `u` stops
 *   authenticating in one step
 * - a new `login(u)` supersedes all of `u`'s earlier tokens
 * - once the TTL lapses, the record is gone and the token fails even if the
 *   socket that presented it earlier is still open
 */

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::backend::auth::sessions::TokenSigner;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::SessionStore;

/// A freshly minted session
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

fn session_key(user_id: &str) -> String {
    format!("session:{}", user_id)
}

#[derive(Clone)]
pub struct SessionAuthenticator {
    signer: TokenSigner,
    store: Arc<dyn SessionStore>,
}

impl SessionAuthenticator {
    pub fn new(signer: TokenSigner, store: Arc<dyn SessionStore>) -> Self {
        Self { signer, store }
    }

    pub fn validity(&self) -> Duration {
        self.signer.validity()
    }

    /// Resolve a token to its user id
    ///
    /// Read-only. Fails with `Authentication` when the signature is bad, the
    /// token expired, or it is no longer the token on record.
    pub async fn authenticate(&self, token: &str) -> BackendResult<String> {
        let claims = self.signer.verify(token)?;

        match self.store.get(&session_key(&claims.sub)).await? {
            Some(current) if current == token => Ok(claims.sub),
            Some(_) => Err(BackendError::authentication("token superseded by a newer session")),
            None => Err(BackendError::authentication("session revoked or expired")),
        }
    }

    /// Mint a token for `user_id` and put it on record
    pub async fn login(&self, user_id: &str) -> BackendResult<Session> {
        if user_id.is_empty() {
            return Err(BackendError::authentication("user id is empty"));
        }

        let (token, expires_at) = self.signer.sign(user_id)?;
        let ttl = (expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO);

        self.store.put(&session_key(user_id), &token, ttl).await?;
        tracing::info!("[Auth] Session started for {}", user_id);

        Ok(Session {
            user_id: user_id.to_string(),
            token,
            expires_at,
        })
    }

    /// Revoke every token issued to `user_id`; idempotent
    pub async fn logout(&self, user_id: &str) -> BackendResult<()> {
        let existed = self.store.delete(&session_key(user_id)).await?;
        if existed {
            tracing::info!("[Auth] Session revoked for {}", user_id);
        } else {
            tracing::debug!("[Auth] No session on record for {}", user_id);
        }
        Ok(())
    }

    /// Revoke and reissue in one step (credential rotation)
    pub async fn rotate(&self, user_id: &str) -> BackendResult<Session> {
        self.logout(user_id).await?;
        self.login(user_id).await
    }
}
