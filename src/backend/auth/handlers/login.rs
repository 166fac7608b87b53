/**
 * Login Handler
 *
 * `POST /login` verifies a user id and password against the account
 * directory, starts a session, and returns the token both in the body and as
 * the session cookie.
 *
 * # Errors
 *
 * - `400 Bad Request` - empty `user_id` or `password`
 * - `401 Unauthorized` - unknown user or wrong password (same answer for both)
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use axum_extra::extract::CookieJar;

use crate::backend::auth::handlers::cookie::session_cookie;
use crate::backend::auth::handlers::types::{LoginRequest, SessionResponse};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, BackendError> {
    if request.user_id.trim().is_empty() {
        return Err(BackendError::handler(StatusCode::BAD_REQUEST, "user_id is empty"));
    }
    if request.password.is_empty() {
        return Err(BackendError::handler(StatusCode::BAD_REQUEST, "password is empty"));
    }

    tracing::info!("[Auth] Login request for {}", request.user_id);

    let valid = state
        .collaborators
        .accounts
        .verify_password(&request.user_id, &request.password)
        .await?;

    if !valid {
        tracing::warn!("[Auth] Invalid credentials for {}", request.user_id);
        return Err(BackendError::authentication("invalid credentials"));
    }

    let session = state.authenticator.login(&request.user_id).await?;
    let cookie = session_cookie(
        &state.config.session_cookie,
        &session.token,
        state.authenticator.validity(),
    );

    Ok((jar.add(cookie), Json(SessionResponse::from(session))))
}
