/**
 * API Route Handlers
 *
 * Session endpoints.
 *
 * # Routes
 *
 * - `GET /ping` - Liveness check, answers `pong`
 * - `POST /login` - Start a session
 * - `DELETE /logout` - Revoke the caller's sessions (requires authentication)
 * - `POST /session/refresh` - Rotate the caller's token (requires authentication)
 */

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};

use crate::backend::auth::{login, logout, refresh};
use crate::backend::middleware::auth_middleware;
use crate::backend::server::state::AppState;

pub async fn ping() -> &'static str {
    "pong"
}

pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/logout", delete(logout))
        .route("/session/refresh", post(refresh))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    router
        .route("/ping", get(ping))
        .route("/login", post(login))
        .merge(protected)
}
