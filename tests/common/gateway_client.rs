//! Scripted gateway client
//!
//! Runs a real `ConnectionSession` in a task, feeding it frames from a
//! channel and exposing its outbound queue, so gateway scenarios can be
//! played without a socket.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use threadline::backend::error::BackendError;
use threadline::backend::gateway::{
    ConnectionSession, GatewayContext, InboundFrame, Outbound, SessionOutcome,
};
use threadline::shared::{ChatRequest, Envelope, EnvelopeKind, MessagePayload};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ScriptedClient {
    pub user_id: String,
    input: mpsc::UnboundedSender<Result<InboundFrame, BackendError>>,
    output: mpsc::Receiver<Outbound>,
    task: JoinHandle<SessionOutcome>,
}

impl ScriptedClient {
    pub fn connect(gateway: &GatewayContext, user_id: &str) -> Self {
        let (handle, output) = gateway.open(user_id);
        let (input, rx) = mpsc::unbounded_channel();
        let inbound = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        let task = tokio::spawn(ConnectionSession::new(gateway.clone(), handle).run(inbound));

        Self {
            user_id: user_id.to_string(),
            input,
            output,
            task,
        }
    }

    pub fn send(&self, frame: &str) {
        let _ = self.input.send(Ok(InboundFrame::Text(frame.to_string())));
    }

    pub fn send_setup(&self, thread_id: &str) {
        self.send(&Envelope::setup(thread_id).encode().expect("encode setup"));
    }

    pub fn send_chat(&self, text: &str, grade: i32) {
        let envelope = Envelope::chat(&ChatRequest::new(text, grade)).expect("chat envelope");
        self.send(&envelope.encode().expect("encode chat"));
    }

    /// Send `setup` and wait for the welcome notice
    pub async fn join(&mut self, thread_id: &str) -> String {
        self.send_setup(thread_id);
        self.expect_notice().await
    }

    pub async fn recv(&mut self) -> Option<Outbound> {
        tokio::time::timeout(RECV_TIMEOUT, self.output.recv())
            .await
            .unwrap_or_else(|_| panic!("{}: nothing received in time", self.user_id))
    }

    pub async fn expect_envelope(&mut self) -> Envelope {
        match self.recv().await {
            Some(Outbound::Frame(frame)) => Envelope::decode(&frame).expect("valid envelope"),
            other => panic!("{}: expected a frame, got {:?}", self.user_id, other),
        }
    }

    pub async fn expect_notice(&mut self) -> String {
        let envelope = self.expect_envelope().await;
        assert!(envelope.is(EnvelopeKind::Notice), "expected notice, got {:?}", envelope);
        envelope.data
    }

    pub async fn expect_message(&mut self) -> MessagePayload {
        let envelope = self.expect_envelope().await;
        envelope.message_payload().expect("message payload")
    }

    pub async fn expect_close(&mut self) -> String {
        match self.recv().await {
            Some(Outbound::Close(reason)) => reason,
            other => panic!("{}: expected close, got {:?}", self.user_id, other),
        }
    }

    /// Nothing is queued right now
    pub fn assert_idle(&mut self) {
        assert!(
            self.output.try_recv().is_err(),
            "{}: unexpected outbound frame",
            self.user_id
        );
    }

    pub fn send_close(&self) {
        let _ = self.input.send(Ok(InboundFrame::Close));
    }

    /// Peer sends a close frame; returns how the session ended
    pub async fn hang_up(self) -> SessionOutcome {
        self.send_close();
        self.finish().await
    }

    /// Wait for the session task to end on its own
    pub async fn finish(self) -> SessionOutcome {
        tokio::time::timeout(RECV_TIMEOUT, self.task)
            .await
            .expect("session did not end in time")
            .expect("session task panicked")
    }
}
