/**
 * Wire Envelope
 *
 * Every frame exchanged over a gateway connection is one JSON object:
 *
 * ```json
 * { "type": "setup" | "notice" | "message", "data": "<string>" }
 * ```
 *
 * `data` is a plain string for `setup` (the thread id, possibly empty) and
 * `notice` (human-readable text). For `message` it is itself a JSON document,
 * a `ChatRequest` inbound or a `MessagePayload` outbound.
 *
 * Legacy clients send the chat kind as `"Message"`; that spelling is accepted
 * on decode and never produced on encode.
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::message::{ChatRequest, MessagePayload};

/// Discriminator of an envelope
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    /// Handshake frame binding a connection to a topic
    Setup,
    /// Server-to-client system notice
    Notice,
    /// Chat message (inbound request or outbound fan-out)
    #[serde(alias = "Message")]
    Message,
}

impl EnvelopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Notice => "notice",
            Self::Message => "message",
        }
    }
}

/// The tagged wire unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    /// Kind of frame
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    /// Kind-specific payload
    #[serde(default)]
    pub data: String,
}

impl Envelope {
    /// Create a setup envelope for a thread id (empty for global presence)
    pub fn setup(topic: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Setup,
            data: topic.into(),
        }
    }

    /// Create a notice envelope
    pub fn notice(text: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Notice,
            data: text.into(),
        }
    }

    /// Create an outbound message envelope from a fan-out payload
    pub fn message(payload: &MessagePayload) -> Result<Self, SharedError> {
        Ok(Self {
            kind: EnvelopeKind::Message,
            data: serde_json::to_string(payload)?,
        })
    }

    /// Create an inbound message envelope from a chat request
    pub fn chat(request: &ChatRequest) -> Result<Self, SharedError> {
        Ok(Self {
            kind: EnvelopeKind::Message,
            data: serde_json::to_string(request)?,
        })
    }

    /// Decode one frame
    ///
    /// Fails on invalid JSON, a missing `type`, or an unknown kind.
    pub fn decode(raw: &str) -> Result<Self, SharedError> {
        serde_json::from_str(raw)
            .map_err(|e| SharedError::serialization(format!("malformed envelope: {}", e)))
    }

    /// Encode to the JSON text sent on the wire
    pub fn encode(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is(&self, kind: EnvelopeKind) -> bool {
        self.kind == kind
    }

    /// Decode the nested chat request of an inbound `message` envelope
    pub fn chat_request(&self) -> Result<ChatRequest, SharedError> {
        self.expect_kind(EnvelopeKind::Message)?;
        serde_json::from_str(&self.data)
            .map_err(|e| SharedError::serialization(format!("malformed chat payload: {}", e)))
    }

    /// Decode the nested fan-out payload of an outbound `message` envelope
    pub fn message_payload(&self) -> Result<MessagePayload, SharedError> {
        self.expect_kind(EnvelopeKind::Message)?;
        serde_json::from_str(&self.data)
            .map_err(|e| SharedError::serialization(format!("malformed message payload: {}", e)))
    }

    fn expect_kind(&self, kind: EnvelopeKind) -> Result<(), SharedError> {
        if self.kind == kind {
            Ok(())
        } else {
            Err(SharedError::message(format!(
                "expected '{}' envelope, got '{}'",
                kind.as_str(),
                self.kind.as_str()
            )))
        }
    }
}
