/**
 * Chat Message Data Structures
 *
 * This module defines the message record returned by the persistence
 * collaborator and the two payload shapes that travel inside a
 * `message`-kind envelope:
 *
 * - `ChatRequest` - what a client sends (`{"message", "grade"}`)
 * - `MessagePayload` - what every connected thread member receives
 *   (`{"author", "thread", "grade", "message", "created_at"}`)
 *
 * The gateway never assigns message ids or timestamps itself. Both come
 * from the persistence collaborator and are copied into the fan-out payload.
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted chat message
///
/// Owned and assigned by the message-persistence collaborator.
///
/// # Fields
/// * `id` - Identifier assigned by the store
/// * `author_id` - User who sent the message
/// * `thread_id` - Thread the message belongs to
/// * `grade` - Client-supplied grade (importance level)
/// * `body` - The message text
/// * `created_at` - Store timestamp, `None` if the store did not report one
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub author_id: String,
    pub thread_id: String,
    pub grade: i32,
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a message record stamped with the current time
    pub fn new(
        id: impl Into<String>,
        author_id: impl Into<String>,
        thread_id: impl Into<String>,
        grade: i32,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            thread_id: thread_id.into(),
            grade,
            body: body.into(),
            created_at: Some(Utc::now()),
        }
    }
}

/// Inbound chat frame payload
///
/// Decoded from the `data` string of a `message` envelope sent by a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// The message text
    pub message: String,
    /// Grade (importance level) chosen by the sender
    pub grade: i32,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, grade: i32) -> Self {
        Self {
            message: message.into(),
            grade,
        }
    }
}

/// Outbound fan-out payload
///
/// Encoded into the `data` string of a `message` envelope pushed to every
/// connected member of the thread. `created_at` serializes as RFC3339 or `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessagePayload {
    pub author: String,
    pub thread: String,
    pub grade: i32,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Message> for MessagePayload {
    fn from(message: &Message) -> Self {
        Self {
            author: message.author_id.clone(),
            thread: message.thread_id.clone(),
            grade: message.grade,
            message: message.body.clone(),
            created_at: message.created_at,
        }
    }
}
