//! JWT credential pair issuance and verification
//!
//! Issues stateless HS256-signed access/refresh pairs and verifies them
//! with an inclusive expiry boundary: a token whose `exp` equals the
//! current second is already expired.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::user::{Role, User};
use crate::domain::DomainError;

/// Token verification failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is not valid for this use")]
    WrongUse,
}

/// Which half of the credential pair a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// JWT claims carried by both token kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Role at issuance time
    pub role: Role,
    /// Access or refresh
    #[serde(rename = "type")]
    pub token_use: TokenUse,
    /// Refresh token identifier, used for server-side rotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl Claims {
    /// Get the user ID from the claims
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    /// Check if the token has expired. The boundary is inclusive:
    /// exp == now is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// A freshly issued credential pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    /// Identifier of the refresh token, to be registered in the
    /// refresh token store
    pub refresh_jti: String,
}

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret key for signing tokens. Mandatory - there is no fallback.
    pub secret: String,
    /// Access token lifetime in minutes
    pub access_ttl_minutes: u64,
    /// Refresh token lifetime in days
    pub refresh_ttl_days: u64,
}

impl TokenConfig {
    /// Create a new token configuration
    pub fn new(secret: impl Into<String>, access_ttl_minutes: u64, refresh_ttl_days: u64) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_minutes,
            refresh_ttl_days,
        }
    }
}

/// Token service for issuing and verifying credential pairs
#[derive(Clone)]
pub struct TokenService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl_minutes", &self.config.access_ttl_minutes)
            .field("refresh_ttl_days", &self.config.refresh_ttl_days)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl TokenService {
    /// Create a new token service with the given configuration
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a fresh access/refresh pair for a verified user
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, DomainError> {
        let now = Utc::now();
        let access_expires_at = now + Duration::minutes(self.config.access_ttl_minutes as i64);
        let refresh_expires_at = now + Duration::days(self.config.refresh_ttl_days as i64);
        let refresh_jti = Uuid::new_v4().to_string();

        let access_claims = Claims {
            sub: user.id().as_str().to_string(),
            role: user.role(),
            token_use: TokenUse::Access,
            jti: None,
            iat: now.timestamp(),
            exp: access_expires_at.timestamp(),
        };

        let refresh_claims = Claims {
            sub: user.id().as_str().to_string(),
            role: user.role(),
            token_use: TokenUse::Refresh,
            jti: Some(refresh_jti.clone()),
            iat: now.timestamp(),
            exp: refresh_expires_at.timestamp(),
        };

        let access_token = encode(&Header::default(), &access_claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign access token: {}", e)))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to sign refresh token: {}", e)))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at,
            refresh_jti,
        })
    }

    /// Verify an access token and return its claims
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;

        if claims.token_use != TokenUse::Access {
            return Err(TokenError::WrongUse);
        }

        Ok(claims)
    }

    /// Verify a refresh token and return its claims. The jti is required.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;

        if claims.token_use != TokenUse::Refresh {
            return Err(TokenError::WrongUse);
        }

        if claims.jti.is_none() {
            return Err(TokenError::Malformed);
        }

        Ok(claims)
    }

    /// Access token lifetime in minutes
    pub fn access_ttl_minutes(&self) -> u64 {
        self.config.access_ttl_minutes
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        // Expiry is checked manually below so the boundary stays inclusive
        // and leeway-free.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = std::collections::HashSet::new();

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if token_data.claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserId;

    fn create_test_user(role: Role) -> User {
        User::new(
            UserId::new("test-user").unwrap(),
            "testuser",
            "testuser@example.com",
            "Test User",
            "hashed_password",
            role,
        )
    }

    fn create_service() -> TokenService {
        TokenService::new(TokenConfig::new("test-secret-key-12345", 30, 7))
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = create_service();
        let user = create_test_user(Role::Manager);

        let pair = service.issue_pair(&user).unwrap();
        assert!(!pair.access_token.is_empty());
        assert!(!pair.refresh_token.is_empty());

        let claims = service.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.user_id(), "test-user");
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.token_use, TokenUse::Access);
        assert!(claims.jti.is_none());

        let refresh = service.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.user_id(), "test-user");
        assert_eq!(refresh.jti.as_deref(), Some(pair.refresh_jti.as_str()));
    }

    #[test]
    fn test_wrong_use_rejected() {
        let service = create_service();
        let user = create_test_user(Role::User);
        let pair = service.issue_pair(&user).unwrap();

        // A refresh token is not a valid access token and vice versa
        assert_eq!(
            service.verify_access(&pair.refresh_token),
            Err(TokenError::WrongUse)
        );
        assert_eq!(
            service.verify_refresh(&pair.access_token),
            Err(TokenError::WrongUse)
        );
    }

    #[test]
    fn test_malformed_token() {
        let service = create_service();

        assert_eq!(
            service.verify_access("not-a-token"),
            Err(TokenError::Malformed)
        );
        assert_eq!(service.verify_access(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service1 = TokenService::new(TokenConfig::new("secret-1", 30, 7));
        let service2 = TokenService::new(TokenConfig::new("secret-2", 30, 7));

        let user = create_test_user(Role::User);
        let pair = service1.issue_pair(&user).unwrap();

        assert_eq!(
            service2.verify_access(&pair.access_token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_expired_token() {
        let service = create_service();
        let now = Utc::now();

        let claims = Claims {
            sub: "test-user".to_string(),
            role: Role::User,
            token_use: TokenUse::Access,
            jti: None,
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-12345"),
        )
        .unwrap();

        assert_eq!(service.verify_access(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let service = create_service();
        let now = Utc::now();

        // exp equal to "now" must be treated as expired, not valid
        let claims = Claims {
            sub: "test-user".to_string(),
            role: Role::User,
            token_use: TokenUse::Access,
            jti: None,
            iat: (now - Duration::minutes(30)).timestamp(),
            exp: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-12345"),
        )
        .unwrap();

        assert_eq!(service.verify_access(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_refresh_jtis_are_unique() {
        let service = create_service();
        let user = create_test_user(Role::User);

        let pair1 = service.issue_pair(&user).unwrap();
        let pair2 = service.issue_pair(&user).unwrap();

        assert_ne!(pair1.refresh_jti, pair2.refresh_jti);
    }

    #[test]
    fn test_claims_expiration_check() {
        let now = Utc::now();

        let live = Claims {
            sub: "u".to_string(),
            role: Role::User,
            token_use: TokenUse::Access,
            jti: None,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(5)).timestamp(),
        };
        assert!(!live.is_expired());

        let dead = Claims {
            exp: now.timestamp(),
            ..live
        };
        assert!(dead.is_expired());
    }
}
