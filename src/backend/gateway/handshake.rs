/**
 * Handshake State Machine
 *
 * A new connection must bind itself to a topic before anything else happens:
 *
 * ```text
 * Connecting ──begin──▶ AwaitingSetup ──setup──▶ Joined(topic)
 *                             │
 *                             └── anything else ──▶ Closed
 * ```
 *
 * The first frame must be a well-formed `setup` envelope. Its `data` is the
 * thread id; an empty string joins the global topic. Any other first frame
 * (malformed JSON, a `notice`, a `message`) is a protocol violation and the
 * connection is closed without ever being registered.
 *
 * Membership is checked here only under `MembershipPolicy::Enforced`. With
 * the default policy any authenticated user may join any thread id.
 */

use std::fmt;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::MembershipDirectory;
use crate::shared::{Envelope, EnvelopeKind};

/// What a connection is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Presence only; chat is refused
    Global,
    /// A conversation thread
    Thread(String),
}

impl Topic {
    /// Topic named by a `setup` payload
    pub fn from_setup(data: &str) -> Self {
        if data.is_empty() {
            Self::Global
        } else {
            Self::Thread(data.to_string())
        }
    }

    pub fn thread_id(&self) -> Option<&str> {
        match self {
            Self::Global => None,
            Self::Thread(id) => Some(id),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Thread(id) => write!(f, "thread {}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    Connecting,
    AwaitingSetup,
    Joined(Topic),
    Closed,
}

/// Whether joining a thread requires membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MembershipPolicy {
    #[default]
    Disabled,
    Enforced,
}

/// Check `user_id` may join `topic` under `policy`
///
/// The global topic is always allowed.
pub async fn authorize_topic(
    policy: MembershipPolicy,
    members: &dyn MembershipDirectory,
    user_id: &str,
    topic: &Topic,
) -> BackendResult<()> {
    let (MembershipPolicy::Enforced, Some(thread_id)) = (policy, topic.thread_id()) else {
        return Ok(());
    };

    if members.is_member(thread_id, user_id).await? {
        Ok(())
    } else {
        Err(BackendError::authentication(format!(
            "{} is not a member of thread {}",
            user_id, thread_id
        )))
    }
}

/// Per-connection handshake
#[derive(Debug)]
pub struct Handshake {
    state: HandshakeState,
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}

impl Handshake {
    pub fn new() -> Self {
        Self {
            state: HandshakeState::Connecting,
        }
    }

    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    pub fn topic(&self) -> Option<&Topic> {
        match &self.state {
            HandshakeState::Joined(topic) => Some(topic),
            _ => None,
        }
    }

    /// The connection is open and waiting for its first frame
    pub fn begin(&mut self) -> BackendResult<()> {
        if self.state != HandshakeState::Connecting {
            return Err(BackendError::protocol(format!(
                "cannot begin handshake from {:?}",
                self.state
            )));
        }
        self.state = HandshakeState::AwaitingSetup;
        Ok(())
    }

    /// Consume the first frame
    ///
    /// On success the state is `Joined(topic)`; on any failure it is `Closed`.
    pub async fn accept(
        &mut self,
        frame: &str,
        user_id: &str,
        policy: MembershipPolicy,
        members: &dyn MembershipDirectory,
    ) -> BackendResult<Topic> {
        if self.state != HandshakeState::AwaitingSetup {
            let err = BackendError::protocol(format!("unexpected setup in {:?}", self.state));
            self.state = HandshakeState::Closed;
            return Err(err);
        }

        let result = match parse_setup(frame) {
            Ok(topic) => authorize_topic(policy, members, user_id, &topic)
                .await
                .map(|_| topic),
            Err(e) => Err(e),
        };

        match result {
            Ok(topic) => {
                self.state = HandshakeState::Joined(topic.clone());
                Ok(topic)
            }
            Err(e) => {
                self.state = HandshakeState::Closed;
                Err(e)
            }
        }
    }

    pub fn close(&mut self) {
        self.state = HandshakeState::Closed;
    }
}

/// Decode a first frame into its topic
pub fn parse_setup(frame: &str) -> BackendResult<Topic> {
    let envelope = Envelope::decode(frame).map_err(|e| BackendError::protocol(e.to_string()))?;

    if !envelope.is(EnvelopeKind::Setup) {
        return Err(BackendError::protocol(format!(
            "first frame must be 'setup', got '{}'",
            envelope.kind.as_str()
        )));
    }

    Ok(Topic::from_setup(&envelope.data))
}
