/**
 * Server Initialization
 *
 * Builds the application state and router from a loaded configuration.
 *
 * # Initialization Process
 *
 * 1. Open the PostgreSQL pool if `DATABASE_URL` is set
 * 2. Wire PostgreSQL or in-memory collaborators accordingly
 * 3. Start the expired-session sweeper
 * 4. Build `AppState` (authenticator, gateway, collaborators)
 * 5. Create the router
 *
 * A missing or unreachable database does not stop startup; the server runs
 * on in-memory collaborators and says so in the log.
 */

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, GatewayConfig};
use crate::backend::server::state::AppState;
use crate::backend::store::{spawn_session_sweeper, Collaborators};

/// Build the state for `config`, connecting to the database if configured
pub async fn build_state(config: GatewayConfig) -> AppState {
    let collaborators = match load_database(&config).await {
        Some(pool) => Collaborators::postgres(pool),
        None => Collaborators::in_memory(),
    };
    spawn_session_sweeper(collaborators.sessions.clone(), config.session_sweep_interval);

    AppState::new(config, collaborators)
}

/// Create and configure the Axum application
pub async fn create_app(config: GatewayConfig) -> Router<()> {
    tracing::info!("[Server] Initializing gateway");

    let app_state = build_state(config).await;
    tracing::info!(
        "[Server] Membership policy {:?}, handshake timeout {:?}",
        app_state.gateway.policy,
        app_state.gateway.handshake_timeout
    );

    create_router(app_state)
}
