//! Admin user management endpoints
//!
//! Role and active-flag changes happen only here, behind the admin guard.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::api::auth::UserResponse;
use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{Role, UserStatus};

/// Query parameters for user listings
#[derive(Debug, Deserialize, Default)]
pub struct UserListQuery {
    pub status: Option<UserStatus>,
}

/// Role change request body
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// List all users
///
/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.user_service.list(query.status).await?;

    Ok(Json(users.iter().map(UserResponse::from_user).collect()))
}

/// Change a user's role
///
/// PATCH /admin/users/{user_id}/role
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<String>,
    Json(request): Json<SetRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    // An admin dropping their own role would lock the account out of
    // this surface mid-session
    if admin.id().as_str() == user_id && request.role != Role::Admin {
        return Err(ApiError::bad_request("Cannot demote your own account"));
    }

    let user = state.user_service.set_role(&user_id, request.role).await?;

    Ok(Json(UserResponse::from_user(&user)))
}

/// Reactivate a deactivated user
///
/// POST /admin/users/{user_id}/activate
pub async fn activate_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.activate(&user_id).await?;

    Ok(Json(UserResponse::from_user(&user)))
}

/// Soft-deactivate a user
///
/// POST /admin/users/{user_id}/deactivate
pub async fn deactivate_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    if admin.id().as_str() == user_id {
        return Err(ApiError::bad_request("Cannot deactivate your own account"));
    }

    let user = state.user_service.deactivate(&user_id).await?;

    Ok(Json(UserResponse::from_user(&user)))
}
