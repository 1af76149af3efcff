//! Security headers middleware.
//!
//! Pages are plain HTML forms with no scripts, so the policy is locked down
//! apart from the identity provider, which forms may redirect to on logout.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Content-Security-Policy allowing form redirects to `provider_origin`.
#[must_use]
pub fn content_security_policy(provider_origin: &str) -> String {
    format!(
        "default-src 'none'; \
         script-src 'none'; \
         style-src 'self'; \
         img-src 'self' data:; \
         form-action 'self' {provider_origin}; \
         base-uri 'self'; \
         frame-ancestors 'none'"
    )
}

/// Add security headers to all responses.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if let Ok(csp) = HeaderValue::from_str(state.content_security_policy()) {
        headers.insert(CONTENT_SECURITY_POLICY, csp);
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static("camera=(), geolocation=(), microphone=(), payment=()"),
    );

    // Cart and order pages are per-visitor
    headers.insert(
        HeaderName::from_static("cache-control"),
        HeaderValue::from_static("no-store, max-age=0"),
    );

    response
}
