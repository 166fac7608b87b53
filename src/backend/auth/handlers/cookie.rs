//! Session cookies

use axum_extra::extract::cookie::{Cookie, SameSite};
use std::time::Duration;

/// Cookie carrying a session token for `max_age`
pub fn session_cookie(name: &str, token: &str, max_age: Duration) -> Cookie<'static> {
    Cookie::build((name.to_owned(), token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::try_from(max_age).unwrap_or(time::Duration::MAX))
        .build()
}

/// Removal cookie that makes the client drop the session cookie
pub fn cleared_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_owned(), ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookie.make_removal();
    cookie
}
