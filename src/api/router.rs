//! Router assembly
//!
//! The rate limiter sits in front of every route, including the auth
//! endpoints, so login attempts are throttled like any other traffic.

use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::middleware::{logging_middleware, rate_limit_middleware, security_headers_middleware};
use super::state::AppState;
use super::{admin, auth, health, v1};

/// Create the full router with application state
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Authentication endpoints (public)
        .nest("/auth", auth::create_auth_router())
        // Authenticated API
        .nest("/v1", v1::create_v1_router())
        // Admin API
        .nest("/admin", admin::create_admin_router())
        // Global middleware; the rate limiter admits ahead of all routes
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
