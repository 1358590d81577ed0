//! User authentication extractors using JWT access tokens
//!
//! A missing Authorization header is not an error: public routes proceed
//! unauthenticated. A header that is present but does not carry a valid
//! bearer token is rejected outright with 401 - a tampered or expired
//! token is not treated as anonymity.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::{Role, User};

/// Extract the bearer token from the Authorization header.
///
/// Returns `Ok(None)` when the header is absent and an error when the
/// header exists but is not a well-formed `Bearer <token>` value.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(auth_header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header encoding"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        _ => Err(ApiError::unauthorized(
            "Authorization header must use the 'Bearer <token>' scheme",
        )),
    }
}

/// Resolve the request to a user, or `None` when no credential was sent.
///
/// Verification failures and deactivated accounts are errors, never
/// silently anonymous.
pub async fn authenticate(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<Option<User>, ApiError> {
    let Some(token) = extract_bearer_token(headers)? else {
        return Ok(None);
    };

    debug!("Verifying access token");

    let claims = state
        .token_service
        .verify_access(&token)
        .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

    let user = state
        .user_service
        .get(claims.user_id())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    // An inactive identity is rejected regardless of credential validity
    if !user.is_active() {
        return Err(ApiError::unauthorized("User account is deactivated"));
    }

    Ok(Some(user))
}

async fn require_role(parts: &Parts, state: &AppState, required: Role) -> Result<User, ApiError> {
    let user = authenticate(&parts.headers, state)
        .await?
        .ok_or_else(|| {
            ApiError::unauthorized(
                "Authentication required. Provide a token via 'Authorization: Bearer <token>'",
            )
        })?;

    if !user.role().grants(required) {
        return Err(ApiError::forbidden(format!("{} role required", required)));
    }

    Ok(user)
}

/// Extractor yielding the authenticated user when a credential was sent,
/// and `None` on public access
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(authenticate(&parts.headers, state).await?))
    }
}

/// Extractor that requires an authenticated user of any role
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequireUser(require_role(parts, state, Role::User).await?))
    }
}

/// Extractor that requires the manager role or above
#[derive(Debug, Clone)]
pub struct RequireManager(pub User);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequireManager(
            require_role(parts, state, Role::Manager).await?,
        ))
    }
}

/// Extractor that requires the admin role
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequireAdmin(require_role(parts, state, Role::Admin).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer eyJhbGciOiJIUzI1NiJ9.test".parse().unwrap(),
        );

        let result = extract_bearer_token(&headers);
        assert_eq!(result.unwrap(), Some("eyJhbGciOiJIUzI1NiJ9.test".to_string()));
    }

    #[test]
    fn test_missing_header_is_not_an_error() {
        let headers = HeaderMap::new();

        let result = extract_bearer_token(&headers);
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());

        let result = extract_bearer_token(&headers);
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_empty_bearer_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer   ".parse().unwrap());

        let result = extract_bearer_token(&headers);
        assert!(result.is_err());
    }

    #[test]
    fn test_trimmed_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer   token-with-spaces   ".parse().unwrap(),
        );

        let result = extract_bearer_token(&headers);
        assert_eq!(result.unwrap(), Some("token-with-spaces".to_string()));
    }
}
