//! Gateway scenarios
//!
//! Thread `t1` has members alice, bob and carol (see `test_app`).

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use std::time::Duration;

use crate::common::{login, test_app, test_app_with, test_config, ScriptedClient};
use threadline::backend::gateway::registry::REPLACED_REASON;
use threadline::backend::gateway::{MembershipPolicy, SessionOutcome, Topic};
use threadline::backend::server::GatewayConfig;

#[tokio::test]
async fn test_message_reaches_connected_members_only() {
    let app = test_app().await;

    let mut alice = ScriptedClient::connect(&app.state.gateway, "alice");
    let mut bob = ScriptedClient::connect(&app.state.gateway, "bob");
    assert_eq!(alice.join("t1").await, "Web Socket Connected (room: t1)");
    assert_eq!(bob.join("t1").await, "Web Socket Connected (room: t1)");

    alice.send_chat("hi", 1);

    let echoed = alice.expect_message().await;
    let received = bob.expect_message().await;
    assert_eq!(echoed, received);
    assert_eq!(received.author, "alice");
    assert_eq!(received.thread, "t1");
    assert_eq!(received.grade, 1);
    assert_eq!(received.message, "hi");

    assert_eq!(app.messages.count().await, 1);
    assert!(app.state.gateway.registry.lookup("carol").await.is_none());

    alice.hang_up().await;
    bob.hang_up().await;
}

#[tokio::test]
async fn test_non_member_connection_does_not_receive() {
    let app = test_app().await;

    let mut alice = ScriptedClient::connect(&app.state.gateway, "alice");
    let mut dave = ScriptedClient::connect(&app.state.gateway, "dave");
    alice.join("t1").await;
    dave.join("t1").await;

    alice.send_chat("members only", 2);
    alice.expect_message().await;
    dave.assert_idle();

    app.members.add_member("t1", "dave").await;
    alice.send_chat("welcome dave", 2);
    alice.expect_message().await;
    assert_eq!(dave.expect_message().await.message, "welcome dave");

    alice.hang_up().await;
    dave.hang_up().await;
}

#[tokio::test]
async fn test_ping_as_first_frame_closes_without_registering() {
    let app = test_app().await;

    let mut client = ScriptedClient::connect(&app.state.gateway, "alice");
    client.send("ping");

    let reason = client.expect_close().await;
    assert!(!reason.is_empty());
    assert_matches!(client.finish().await, SessionOutcome::Rejected(e) if e.is_protocol());
    assert!(app.state.gateway.registry.lookup("alice").await.is_none());
}

#[tokio::test]
async fn test_reconnect_routes_pushes_to_newest_connection() {
    let app = test_app().await;

    let mut first = ScriptedClient::connect(&app.state.gateway, "alice");
    first.join("t1").await;

    let mut second = ScriptedClient::connect(&app.state.gateway, "alice");
    second.join("t1").await;

    assert_eq!(first.expect_close().await, REPLACED_REASON);
    assert_matches!(first.finish().await, SessionOutcome::Finished { cause: None, .. });

    let mut bob = ScriptedClient::connect(&app.state.gateway, "bob");
    bob.join("t1").await;
    bob.send_chat("for alice", 1);
    bob.expect_message().await;
    assert_eq!(second.expect_message().await.message, "for alice");

    assert!(app.state.gateway.registry.lookup("alice").await.is_some());
    second.hang_up().await;
    bob.hang_up().await;
    assert!(app.state.gateway.registry.is_empty().await);
}

#[tokio::test]
async fn test_global_connection_receives_welcome_and_cannot_chat() {
    let app = test_app().await;

    let mut alice = ScriptedClient::connect(&app.state.gateway, "alice");
    assert_eq!(alice.join("").await, "Web Socket Connected");

    alice.send_chat("hello?", 1);
    assert_eq!(alice.expect_notice().await, "join a thread to send messages");
    assert_eq!(app.messages.count().await, 0);

    assert_matches!(
        alice.hang_up().await,
        SessionOutcome::Finished { topic: Topic::Global, cause: None }
    );
}

#[tokio::test]
async fn test_persistence_failure_is_reported_to_sender_only() {
    let app = test_app().await;

    let mut alice = ScriptedClient::connect(&app.state.gateway, "alice");
    let mut bob = ScriptedClient::connect(&app.state.gateway, "bob");
    alice.join("t1").await;
    bob.join("t1").await;

    app.messages.set_failing(true);
    alice.send_chat("lost", 1);
    assert!(alice.expect_notice().await.starts_with("message not sent"));
    bob.assert_idle();

    app.messages.set_failing(false);
    alice.send_chat("kept", 1);
    assert_eq!(alice.expect_message().await.message, "kept");
    assert_eq!(bob.expect_message().await.message, "kept");

    alice.hang_up().await;
    bob.hang_up().await;
}

#[tokio::test]
async fn test_malformed_frame_disconnects_and_releases() {
    let app = test_app().await;

    let mut alice = ScriptedClient::connect(&app.state.gateway, "alice");
    alice.join("t1").await;
    alice.send(r#"{"type":"message","data":"not a chat payload"}"#);

    alice.expect_close().await;
    assert_matches!(
        alice.finish().await,
        SessionOutcome::Finished { cause: Some(e), .. } if e.is_protocol()
    );
    assert!(app.state.gateway.registry.is_empty().await);
}

#[tokio::test]
async fn test_clean_close_sends_farewell() {
    let app = test_app().await;

    let mut alice = ScriptedClient::connect(&app.state.gateway, "alice");
    alice.join("t1").await;
    alice.send(r#"{"type":"setup","data":"t2"}"#);
    alice.send_close();

    assert_eq!(alice.expect_close().await, "websocket connection closed");
    assert_matches!(
        alice.finish().await,
        SessionOutcome::Finished { topic: Topic::Thread(ref id), cause: None } if id == "t1"
    );
}

#[tokio::test(start_paused = true)]
async fn test_silent_client_times_out() {
    let app = test_app_with(GatewayConfig {
        handshake_timeout: Duration::from_secs(2),
        ..test_config()
    })
    .await;

    let mut client = ScriptedClient::connect(&app.state.gateway, "alice");

    assert!(client.expect_close().await.contains("timed out"));
    assert_matches!(client.finish().await, SessionOutcome::Rejected(e) if e.is_protocol());
    assert!(app.state.gateway.registry.is_empty().await);
}

#[tokio::test]
async fn test_enforced_membership_rejects_outsiders() {
    let config = GatewayConfig {
        membership_policy: MembershipPolicy::Enforced,
        ..test_config()
    };
    let app = test_app_with(config).await;

    let mut dave = ScriptedClient::connect(&app.state.gateway, "dave");
    dave.send_setup("t1");
    dave.expect_close().await;
    assert_matches!(dave.finish().await, SessionOutcome::Rejected(e) if e.is_authentication());

    let mut alice = ScriptedClient::connect(&app.state.gateway, "alice");
    assert_eq!(alice.join("t1").await, "Web Socket Connected (room: t1)");
    alice.hang_up().await;
}

#[tokio::test]
async fn test_logout_does_not_close_open_connections() {
    let app = test_app().await;
    let session = login(&app.server, "alice").await;

    let mut alice = ScriptedClient::connect(&app.state.gateway, "alice");
    alice.join("t1").await;

    app.state.authenticator.logout("alice").await.unwrap();
    assert!(app.state.authenticator.authenticate(&session.token).await.is_err());

    alice.send_chat("still here", 1);
    assert_eq!(alice.expect_message().await.message, "still here");
    alice.hang_up().await;
}
