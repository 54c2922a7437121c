//! Middleware: bearer authentication and security headers.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use wild_common::error::WildError;

use crate::auth;

/// The signed-in profile, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub profile_id: i64,
    pub username: String,
}

/// Decode `Authorization: Bearer <access token>`.
fn authenticate(headers: &HeaderMap) -> Result<AuthContext, WildError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(WildError::Unauthorized)?
        .strip_prefix("Bearer ")
        .ok_or(WildError::Unauthorized)?;

    let config = wild_common::config::get();
    let claims = auth::validate_token(token, &config.auth.jwt_secret)
        .map_err(|_| WildError::InvalidToken)?;

    // refresh tokens only work on /auth/refresh
    if claims.token_type != auth::ACCESS {
        return Err(WildError::InvalidToken);
    }

    let profile_id = claims.profile_id().ok_or(WildError::InvalidToken)?;
    Ok(AuthContext {
        profile_id,
        username: claims.username,
    })
}

/// Reject the request unless it carries a valid access token.
pub async fn auth_middleware(mut request: Request, next: Next) -> Result<Response, WildError> {
    let ctx = authenticate(request.headers())?;
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Attach an [`AuthContext`] when a valid token is present; otherwise let the
/// request through anonymously.
pub async fn optional_auth_middleware(mut request: Request, next: Next) -> Response {
    match authenticate(request.headers()) {
        Ok(ctx) => {
            request.extensions_mut().insert(ctx);
        }
        Err(WildError::Unauthorized) => {}
        Err(e) => tracing::debug!(error = %e, "Ignoring bad token on public route"),
    }
    next.run(request).await
}

/// Add security headers to every response.
pub async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let h = response.headers_mut();

    for (name, value) in [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "DENY"),
        ("referrer-policy", "strict-origin-when-cross-origin"),
        ("permissions-policy", "camera=(), microphone=(), geolocation=(), payment=()"),
        (
            "content-security-policy",
            "default-src 'self'; img-src 'self' data: blob:; frame-ancestors 'none'",
        ),
    ] {
        h.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }

    response
}
