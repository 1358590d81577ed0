//! Authentication API endpoints
//!
//! Registration, login, refresh exchange, and logout for JWT-based
//! authentication. Issuance is stateless; the only server-side state is
//! the refresh rotation store.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::middleware::MaybeUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{Role, User};
use crate::infrastructure::user::CreateUserRequest;

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Refresh exchange request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Login response carrying the credential pair and the identity snapshot
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_at: String,
    pub user: UserResponse,
}

/// Refresh response carrying the rotated credential pair
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// User response (safe to expose, never includes the password hash)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub status: String,
    pub is_verified: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            full_name: user.full_name().to_string(),
            role: user.role(),
            status: format!("{:?}", user.status()).to_lowercase(),
            is_verified: user.is_verified(),
            created_at: user.created_at().to_rfc3339(),
            last_login_at: user.last_login_at().map(|t| t.to_rfc3339()),
        }
    }
}

/// Register a new user
///
/// POST /auth/register
///
/// New accounts always start with the `user` role.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let user = state
        .user_service
        .create(CreateUserRequest {
            username: request.username,
            email: request.email,
            full_name: request.full_name,
            password: request.password,
            role: Role::User,
        })
        .await?;

    info!(user_id = %user.id(), username = %user.username(), "New user registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// Login with username and password
///
/// POST /auth/login
///
/// Returns an access/refresh pair on success. Unknown usernames, wrong
/// passwords, and deactivated accounts all fail with the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&request.username, &request.password)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    let pair = state
        .token_service
        .issue_pair(&user)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    state
        .refresh_tokens
        .put(user.id(), &pair.refresh_jti)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!(user_id = %user.id(), "User logged in");

    Ok(Json(LoginResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "bearer".to_string(),
        expires_at: pair.access_expires_at.to_rfc3339(),
        user: UserResponse::from_user(&user),
    }))
}

/// Exchange a refresh token for a rotated credential pair
///
/// POST /auth/refresh
///
/// The presented refresh token must be the user's current one; a redeemed
/// or revoked token is rejected. The pair is rotated atomically, so each
/// refresh token is single-use.
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let claims = state
        .token_service
        .verify_refresh(&request.refresh_token)
        .map_err(|e| ApiError::unauthorized(format!("Invalid refresh token: {}", e)))?;

    let user = state
        .user_service
        .get(claims.user_id())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("User not found or inactive"))?;

    if !user.is_active() {
        return Err(ApiError::unauthorized("User not found or inactive"));
    }

    let presented_jti = claims
        .jti
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    let pair = state
        .token_service
        .issue_pair(&user)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let rotated = state
        .refresh_tokens
        .exchange(user.id(), presented_jti, &pair.refresh_jti)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    if !rotated {
        return Err(ApiError::unauthorized("Refresh token is no longer valid"));
    }

    Ok(Json(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "bearer".to_string(),
    }))
}

/// Logout
///
/// POST /auth/logout
///
/// Revokes the caller's refresh token server-side when authenticated.
/// The client discards its copies either way, so the endpoint succeeds
/// for anonymous callers too.
pub async fn logout(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<LogoutResponse>, ApiError> {
    if let Some(user) = user {
        state
            .refresh_tokens
            .revoke(user.id())
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?;

        info!(user_id = %user.id(), "User logged out");
    }

    Ok(Json(LogoutResponse {
        message: "Logged out successfully".to_string(),
    }))
}
