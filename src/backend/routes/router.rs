/**
 * Router Configuration
 *
 * Combines the API and gateway routes into one Axum router, wraps it in a
 * `TraceLayer`, and binds the application state.
 *
 * Unknown paths fall through to a JSON 404.
 */

use axum::{http::StatusCode, Router};
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::gateway_routes::configure_gateway_routes;
use crate::backend::server::state::AppState;

pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new();
    let router = configure_api_routes(router, &app_state);
    let router = configure_gateway_routes(router, &app_state);

    router
        .fallback(|| async { BackendError::handler(StatusCode::NOT_FOUND, "not found") })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
