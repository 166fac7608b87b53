//! Authentication test helpers
//!
//! Builds a test server over in-memory collaborators, keeping concrete handles
//! to each store so tests can seed accounts and memberships and inspect
//! persisted messages. `socket_app` serves over a real port for WebSocket
//! tests; everything else uses the in-process transport.

use axum::http::{header, HeaderName, HeaderValue};
use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;

use threadline::backend::auth::SessionResponse;
use threadline::backend::routes::create_router;
use threadline::backend::server::{AppState, GatewayConfig};
use threadline::backend::store::{
    Collaborators, MemoryAccountDirectory, MemoryMembershipDirectory, MemoryMessageStore,
    MemorySessionStore,
};

pub const TEST_PASSWORD: &str = "password123";

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub accounts: Arc<MemoryAccountDirectory>,
    pub members: Arc<MemoryMembershipDirectory>,
    pub messages: Arc<MemoryMessageStore>,
}

pub fn test_config() -> GatewayConfig {
    GatewayConfig::builder()
        .jwt_secret("integration-test-secret")
        .session_ttl(Duration::from_secs(3600))
        .handshake_timeout(Duration::from_secs(2))
        .outbound_buffer(32)
        .build()
        .expect("valid test config")
}

/// State over in-memory collaborators with `alice`, `bob` and `carol` as
/// accounts and members of thread `t1`
pub async fn test_app() -> TestApp {
    test_app_with(test_config()).await
}

pub async fn test_app_with(config: GatewayConfig) -> TestApp {
    build_test_app(config, false).await
}

/// Like `test_app`, served on a real local port so `/ws` can be upgraded
pub async fn socket_app() -> TestApp {
    build_test_app(test_config(), true).await
}

async fn build_test_app(config: GatewayConfig, http_transport: bool) -> TestApp {
    let accounts = Arc::new(MemoryAccountDirectory::new());
    let members = Arc::new(MemoryMembershipDirectory::new());
    let messages = Arc::new(MemoryMessageStore::new());

    for user in ["alice", "bob", "carol"] {
        accounts.insert(user, TEST_PASSWORD).await.expect("seed account");
        members.add_member("t1", user).await;
    }

    let collaborators = Collaborators {
        sessions: Arc::new(MemorySessionStore::new()),
        members: members.clone(),
        messages: messages.clone(),
        accounts: accounts.clone(),
    };
    let state = AppState::new(config, collaborators);
    let router = create_router(state.clone());
    let server = if http_transport {
        TestServer::builder().http_transport().build(router)
    } else {
        TestServer::new(router)
    }
    .expect("test server");

    TestApp {
        server,
        state,
        accounts,
        members,
        messages,
    }
}

/// Log in through the HTTP boundary
pub async fn login(server: &TestServer, user_id: &str) -> SessionResponse {
    server
        .post("/login")
        .json(&serde_json::json!({
            "user_id": user_id,
            "password": TEST_PASSWORD,
        }))
        .await
        .json::<SessionResponse>()
}

/// `Authorization: Bearer <token>` header
pub fn auth_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).expect("header value"),
    )
}

/// `Cookie: session=<token>` header
pub fn cookie_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::COOKIE,
        HeaderValue::from_str(&format!("session={}", token)).expect("header value"),
    )
}
