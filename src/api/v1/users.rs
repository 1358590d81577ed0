//! Profile endpoints for the authenticated user

use axum::extract::State;
use serde::Deserialize;

use crate::api::auth::UserResponse;
use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::user::{UpdatePasswordRequest, UpdateProfileRequest};

/// Profile update request body. Absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Password change request body
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Get the authenticated user's profile
///
/// GET /v1/users/me
pub async fn get_me(RequireUser(user): RequireUser) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(UserResponse::from_user(&user)))
}

/// Update the authenticated user's profile
///
/// PATCH /v1/users/me
pub async fn update_me(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<UpdateMeRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state
        .user_service
        .update_profile(
            user.id().as_str(),
            UpdateProfileRequest {
                full_name: request.full_name,
                email: request.email,
            },
        )
        .await?;

    Ok(Json(UserResponse::from_user(&updated)))
}

/// Change the authenticated user's password
///
/// PUT /v1/users/me/password
pub async fn change_password(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state
        .user_service
        .update_password(
            user.id().as_str(),
            UpdatePasswordRequest {
                current_password: request.current_password,
                new_password: request.new_password,
            },
        )
        .await?;

    Ok(Json(UserResponse::from_user(&updated)))
}
