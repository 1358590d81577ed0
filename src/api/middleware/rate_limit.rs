//! Global rate limiting middleware
//!
//! Applied ahead of every route, including the authentication endpoints:
//! login attempts are throttled exactly like normal API traffic.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Fixed-window admission control keyed by client address
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&request);
    let decision = state.rate_limiter.check_and_record(&key).await;

    if !decision.allowed {
        warn!(
            client = %key,
            limit = decision.limit,
            retry_after_secs = decision.retry_after_secs,
            "Rate limit exceeded"
        );

        let mut response = ApiError::rate_limited(format!(
            "Rate limit of {} requests per window exceeded",
            decision.limit
        ))
        .into_response();

        response
            .headers_mut()
            .insert(header::RETRY_AFTER, decision.retry_after_secs.into());

        return response;
    }

    next.run(request).await
}

/// Resolve the client key: the first forwarded address when behind a
/// proxy, otherwise the peer address.
fn client_key(request: &Request<Body>) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
