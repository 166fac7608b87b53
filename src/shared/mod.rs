//! Shared Module
//!
//! Wire types exchanged between the gateway and its clients. Nothing in here
//! depends on the server runtime, so client code can reuse the same
//! definitions to build and decode frames.

/// Envelope framing (`setup`, `notice`, `message`)
pub mod envelope;

/// Persisted message record and chat payloads
pub mod message;

/// Shared error types
pub mod error;

pub use envelope::{Envelope, EnvelopeKind};
pub use error::SharedError;
pub use message::{ChatRequest, Message, MessagePayload};
