/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` is the central state container:
 * - the loaded `GatewayConfig`
 * - the `SessionAuthenticator` (token signer + session store)
 * - the `GatewayContext` (connection registry, relay, handshake settings)
 * - the `Collaborators` bundle (sessions, membership, messages, accounts)
 *
 * Everything inside is an `Arc` or a cheap clone of one, so cloning
 * `AppState` per request costs a handful of reference-count bumps.
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers extract only the part they need,
 * e.g. `State(gateway): State<GatewayContext>` in the upgrade handler.
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::authenticator::SessionAuthenticator;
use crate::backend::auth::sessions::TokenSigner;
use crate::backend::gateway::{ConnectionRegistry, GatewayContext};
use crate::backend::server::config::GatewayConfig;
use crate::backend::store::Collaborators;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub authenticator: SessionAuthenticator,
    pub gateway: GatewayContext,
    pub collaborators: Collaborators,
}

impl AppState {
    /// Wire the state from a configuration and a set of collaborators
    pub fn new(config: GatewayConfig, collaborators: Collaborators) -> Self {
        let authenticator = SessionAuthenticator::new(
            TokenSigner::new(&config.jwt_secret, config.session_ttl),
            collaborators.sessions.clone(),
        );
        let gateway = GatewayContext::new(&config, &collaborators);

        Self {
            config: Arc::new(config),
            authenticator,
            gateway,
            collaborators,
        }
    }
}

impl FromRef<AppState> for SessionAuthenticator {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.authenticator.clone()
    }
}

impl FromRef<AppState> for GatewayContext {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.gateway.clone()
    }
}

impl FromRef<AppState> for ConnectionRegistry {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.gateway.registry.clone()
    }
}

impl FromRef<AppState> for Collaborators {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.collaborators.clone()
    }
}
