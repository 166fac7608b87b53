//! Gateway over a real WebSocket upgrade
//!
//! Covers the transport adapter: frame mapping, the writer task, and close
//! frames with their reasons.

use axum_test::{TestWebSocket, WsMessage};
use pretty_assertions::assert_eq;
use std::time::Duration;

use crate::common::{auth_header, login, socket_app, TestApp};
use threadline::shared::{ChatRequest, Envelope, EnvelopeKind};

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

async fn open_socket(app: &TestApp, user_id: &str) -> TestWebSocket {
    let session = login(&app.server, user_id).await;
    let (name, value) = auth_header(&session.token);
    app.server
        .get_websocket("/ws")
        .add_header(name, value)
        .await
        .into_websocket()
        .await
}

async fn next_message(socket: &mut TestWebSocket) -> WsMessage {
    tokio::time::timeout(RECEIVE_TIMEOUT, socket.receive_message())
        .await
        .expect("nothing received in time")
}

async fn next_envelope(socket: &mut TestWebSocket) -> Envelope {
    match next_message(socket).await {
        WsMessage::Text(text) => Envelope::decode(&text).expect("valid envelope"),
        other => panic!("expected a text frame, got {:?}", other),
    }
}

async fn expect_notice(socket: &mut TestWebSocket) -> String {
    let envelope = next_envelope(socket).await;
    assert!(envelope.is(EnvelopeKind::Notice), "expected notice, got {:?}", envelope);
    envelope.data
}

async fn expect_close_reason(socket: &mut TestWebSocket) -> String {
    match next_message(socket).await {
        WsMessage::Close(Some(frame)) => {
            let reason: &str = &frame.reason;
            reason.to_owned()
        }
        other => panic!("expected a close frame, got {:?}", other),
    }
}

async fn join(socket: &mut TestWebSocket, thread_id: &str) -> String {
    socket
        .send_text(Envelope::setup(thread_id).encode().expect("encode setup"))
        .await;
    expect_notice(socket).await
}

async fn wait_until_released(app: &TestApp, user_id: &str) {
    for _ in 0..200 {
        if app.state.gateway.registry.lookup(user_id).await.is_none() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{} is still registered", user_id);
}

#[tokio::test]
async fn test_socket_message_reaches_both_members() {
    let app = socket_app().await;
    let mut alice = open_socket(&app, "alice").await;
    let mut bob = open_socket(&app, "bob").await;

    assert_eq!(join(&mut alice, "t1").await, "Web Socket Connected (room: t1)");
    assert_eq!(join(&mut bob, "t1").await, "Web Socket Connected (room: t1)");

    let chat = Envelope::chat(&ChatRequest::new("over the wire", 3)).expect("chat envelope");
    alice.send_text(chat.encode().expect("encode chat")).await;

    for socket in [&mut alice, &mut bob] {
        let payload = next_envelope(socket).await.message_payload().expect("message payload");
        assert_eq!(payload.author, "alice");
        assert_eq!(payload.thread, "t1");
        assert_eq!(payload.grade, 3);
        assert_eq!(payload.message, "over the wire");
    }
    assert_eq!(app.messages.count().await, 1);
}

#[tokio::test]
async fn test_socket_accepts_utf8_binary_setup() {
    let app = socket_app().await;
    let mut alice = open_socket(&app, "alice").await;

    let setup = Envelope::setup("t1").encode().expect("encode setup");
    alice.send_message(WsMessage::binary(setup.into_bytes())).await;

    assert_eq!(expect_notice(&mut alice).await, "Web Socket Connected (room: t1)");
    assert!(app.state.gateway.registry.lookup("alice").await.is_some());
}

#[tokio::test]
async fn test_socket_non_utf8_binary_closes_with_reason() {
    let app = socket_app().await;
    let mut bob = open_socket(&app, "bob").await;
    join(&mut bob, "t1").await;

    bob.send_message(WsMessage::binary(vec![0xff, 0xfe, 0xfd])).await;

    assert_eq!(expect_close_reason(&mut bob).await, "binary frame is not UTF-8");
    wait_until_released(&app, "bob").await;
}

#[tokio::test]
async fn test_socket_rejects_non_setup_first_frame() {
    let app = socket_app().await;
    let mut alice = open_socket(&app, "alice").await;

    alice.send_text("ping").await;

    assert!(!expect_close_reason(&mut alice).await.is_empty());
    assert!(app.state.gateway.registry.is_empty().await);
}
