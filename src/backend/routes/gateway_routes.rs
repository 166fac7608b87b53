/**
 * Gateway Route Handlers
 *
 * # Routes
 *
 * - `GET /ws` - WebSocket upgrade into a gateway session (requires authentication)
 * - `GET /gateway/stats` - Number of registered connections
 */

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::backend::gateway::socket::handle_websocket;
use crate::backend::gateway::ConnectionRegistry;
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GatewayStats {
    pub connected_users: usize,
}

pub async fn gateway_stats(State(registry): State<ConnectionRegistry>) -> Json<GatewayStats> {
    Json(GatewayStats {
        connected_users: registry.len().await,
    })
}

pub fn configure_gateway_routes(
    router: Router<AppState>,
    app_state: &AppState,
) -> Router<AppState> {
    let upgrade = Router::new()
        .route("/ws", get(handle_websocket))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    router
        .route("/gateway/stats", get(gateway_stats))
        .merge(upgrade)
}
