//! Session middleware
//!
//! Resolves the session token (cookie first, then `Authorization: Bearer`)
//! into a `RequestContext` stored in request extensions. Missing, invalid
//! or expired tokens produce an anonymous context, never an error.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use tracing::warn;

use crate::application::{AccountService, RequestContext};
use crate::interfaces::graphql::session::SESSION_COOKIE;

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

pub async fn session_middleware(
    State(accounts): State<Arc<AccountService>>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| bearer_token(request.headers()));

    let context = match token {
        None => RequestContext::anonymous(),
        Some(token) => match accounts.resolve_session(&token).await {
            Ok(Some(user)) => RequestContext::authenticated(user),
            Ok(None) => RequestContext::anonymous(),
            Err(e) => {
                warn!(error = %e, "Session lookup failed, continuing anonymously");
                RequestContext::anonymous()
            }
        },
    };

    request.extensions_mut().insert(context);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn parses_bearer_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);
    }
}
