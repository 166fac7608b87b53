/**
 * Authentication Handler Types
 *
 * Request and response bodies for the login, logout and refresh handlers.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::auth::authenticator::Session;

/// Login request
///
/// Missing fields decode as empty strings and are rejected with 400 by the
/// handler.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub password: String,
}

/// Session response
///
/// Returned by login and refresh. The same token is also set as the session
/// cookie.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub user_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            user_id: session.user_id,
            token: session.token,
            expires_at: session.expires_at,
        }
    }
}
