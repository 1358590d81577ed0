//! Admin API endpoints for user management

pub mod users;

use axum::{
    routing::{get, patch, post},
    Router,
};

use super::state::AppState;

/// Create admin API router
pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{user_id}/role", patch(users::set_role))
        .route("/users/{user_id}/activate", post(users::activate_user))
        .route("/users/{user_id}/deactivate", post(users::deactivate_user))
}
