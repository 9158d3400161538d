use async_graphql::Context;
use axum::http::header::SET_COOKIE;
use axum_extra::extract::cookie::{Cookie, SameSite};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

pub fn session_cookie(token: String, lifetime_hours: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(lifetime_hours))
        .build()
}

pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}

pub(crate) fn set_session(ctx: &Context<'_>, token: String, lifetime_hours: i64) {
    ctx.append_http_header(SET_COOKIE, session_cookie(token, lifetime_hours).to_string());
}

pub(crate) fn clear_session(ctx: &Context<'_>) {
    ctx.append_http_header(SET_COOKIE, cleared_session_cookie().to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_http_only_for_a_year() {
        let header = session_cookie("abc".to_string(), 24 * 365).to_string();
        assert!(header.starts_with("token=abc"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=31536000"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let header = cleared_session_cookie().to_string();
        assert!(header.starts_with("token=;"));
        assert!(header.contains("Max-Age=0"));
    }
}
