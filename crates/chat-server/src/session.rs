use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use chat_core::SessionId;

pub const SESSION_COOKIE: &str = "session_id";

/// Session id carried by the browser, if the cookie is present, correctly
/// signed and well formed.
pub fn session_from(jar: &SignedCookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

pub fn with_session(jar: SignedCookieJar, id: SessionId) -> SignedCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    jar.add(cookie)
}
