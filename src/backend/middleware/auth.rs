/**
 * Authentication Middleware
 *
 * This module protects routes that require an authenticated session. The
 * credential is read from the `Authorization: Bearer <token>` header, or
 * failing that from the session cookie, and resolved through the
 * `SessionAuthenticator`.
 *
 * On success an `AuthenticatedUser` is attached to the request extensions;
 * handlers pick it up with the `AuthUser` extractor. A missing, expired or
 * revoked credential is answered with 401 before the handler runs, which is
 * how `GET /ws` refuses an upgrade without touching gateway state.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated user data resolved from the session token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    /// The token that authenticated this request
    pub token: String,
}

/// Authentication middleware
///
/// 1. Extracts the token from the Authorization header or the session cookie
/// 2. Resolves it to a user id (signature, expiry and revocation checks)
/// 3. Attaches the user to request extensions
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = extract_token(request.headers(), &jar, &app_state.config.session_cookie)
        .ok_or_else(|| {
            tracing::warn!("[Auth] Missing credential for {}", request.uri().path());
            BackendError::authentication("missing credential")
        })?;

    let user_id = app_state.authenticator.authenticate(&token).await.map_err(|e| {
        tracing::warn!("[Auth] Rejected credential: {}", e);
        e
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id, token });

    Ok(next.run(request).await)
}

/// Bearer header first, then the session cookie
pub fn extract_token(headers: &HeaderMap, jar: &CookieJar, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    jar.get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Axum extractor for the authenticated user
///
/// Only valid on routes behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                BackendError::authentication("not authenticated")
            })
    }
}
