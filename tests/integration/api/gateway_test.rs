//! Gateway HTTP surface tests
//!
//! The upgrade route's authentication gate and the diagnostics endpoint.

use axum::http::StatusCode;

use crate::common::{auth_header, login, test_app, ScriptedClient};
use threadline::backend::routes::gateway_routes::GatewayStats;

#[tokio::test]
async fn test_upgrade_without_credential_is_rejected() {
    let app = test_app().await;
    let response = app.server.get("/ws").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(app.state.gateway.registry.is_empty().await);
}

#[tokio::test]
async fn test_upgrade_with_revoked_token_is_rejected() {
    let app = test_app().await;
    let session = login(&app.server, "alice").await;
    app.state.authenticator.logout("alice").await.unwrap();

    let (name, value) = auth_header(&session.token);
    let response = app.server.get("/ws").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(app.state.gateway.registry.is_empty().await);
}

#[tokio::test]
async fn test_authenticated_non_upgrade_request_passes_auth() {
    let app = test_app().await;
    let session = login(&app.server, "alice").await;

    let (name, value) = auth_header(&session.token);
    let response = app.server.get("/ws").add_header(name, value).await;
    assert_ne!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert!(app.state.gateway.registry.is_empty().await);
}

#[tokio::test]
async fn test_stats_counts_registered_connections() {
    let app = test_app().await;

    let stats: GatewayStats = app.server.get("/gateway/stats").await.json();
    assert_eq!(stats.connected_users, 0);

    let mut alice = ScriptedClient::connect(&app.state.gateway, "alice");
    alice.join("t1").await;

    let stats: GatewayStats = app.server.get("/gateway/stats").await.json();
    assert_eq!(stats.connected_users, 1);

    alice.hang_up().await;
    let stats: GatewayStats = app.server.get("/gateway/stats").await.json();
    assert_eq!(stats.connected_users, 0);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = test_app().await;
    let response = app.server.get("/nope").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
