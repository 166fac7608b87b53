/**
 * Logout and Refresh Handlers
 *
 * Both sit behind the auth middleware.
 *
 * - `DELETE /logout` revokes every token of the caller and clears the cookie.
 *   Connections that are already open are not closed; they keep running
 *   until they end on their own.
 * - `POST /session/refresh` revokes the caller's tokens and issues a new one
 *   in a single step.
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use axum_extra::extract::CookieJar;

use crate::backend::auth::handlers::cookie::{cleared_cookie, session_cookie};
use crate::backend::auth::handlers::types::SessionResponse;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;

pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, BackendError> {
    state.authenticator.logout(&user.user_id).await?;
    tracing::info!("[Auth] {} logged out", user.user_id);

    Ok((
        StatusCode::NO_CONTENT,
        jar.add(cleared_cookie(&state.config.session_cookie)),
    ))
}

pub async fn refresh(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
) -> Result<impl IntoResponse, BackendError> {
    let session = state.authenticator.rotate(&user.user_id).await?;
    let cookie = session_cookie(
        &state.config.session_cookie,
        &session.token,
        state.authenticator.validity(),
    );

    Ok((jar.add(cookie), Json(SessionResponse::from(session))))
}
