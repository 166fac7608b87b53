//! PostgreSQL collaborators
//!
//! Read/write paths the gateway needs against the tables owned by the CRUD
//! layer: `thread_users`, `messages` and `users`. Schema management belongs
//! to that layer; nothing here creates or migrates tables.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::HashSet;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::{AccountDirectory, MembershipDirectory, MessageStore};
use crate::shared::Message;

/// Membership from the `thread_users` join table
#[derive(Clone)]
pub struct PgMembershipDirectory {
    pool: PgPool,
}

impl PgMembershipDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipDirectory for PgMembershipDirectory {
    async fn list_members(&self, thread_id: &str) -> BackendResult<HashSet<String>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id
            FROM thread_users
            WHERE thread_id = $1
            "#,
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| BackendError::membership(e.to_string()))?;

        rows.into_iter()
            .map(|row| row.try_get::<String, _>("user_id"))
            .collect::<Result<HashSet<_>, _>>()
            .map_err(|e| BackendError::membership(e.to_string()))
    }

    async fn is_member(&self, thread_id: &str, user_id: &str) -> BackendResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM thread_users WHERE thread_id = $1 AND user_id = $2
            ) AS member
            "#,
        )
        .bind(thread_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| BackendError::membership(e.to_string()))?;

        row.try_get("member").map_err(|e| BackendError::membership(e.to_string()))
    }
}

/// Messages in the `messages` table
#[derive(Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn create(
        &self,
        body: &str,
        grade: i32,
        author_id: &str,
        thread_id: &str,
    ) -> BackendResult<Message> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO messages (id, message, grade, user_id, thread_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            "#,
        )
        .bind(&id)
        .bind(body)
        .bind(grade)
        .bind(author_id)
        .bind(thread_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| BackendError::persistence(e.to_string()))?;

        Ok(Message {
            id,
            author_id: author_id.to_string(),
            thread_id: thread_id.to_string(),
            grade,
            body: body.to_string(),
            created_at: Some(now),
        })
    }
}

/// Password hashes in the `users` table
#[derive(Clone)]
pub struct PgAccountDirectory {
    pool: PgPool,
}

impl PgAccountDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountDirectory for PgAccountDirectory {
    async fn verify_password(&self, user_id: &str, password: &str) -> BackendResult<bool> {
        let row = sqlx::query("SELECT password FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(false);
        };
        let hash: String = row.try_get("password")?;

        bcrypt::verify(password, &hash)
            .map_err(|e| BackendError::persistence(format!("password verification failed: {}", e)))
    }
}
