//! Server-side refresh token rotation store
//!
//! Tracks the single currently valid refresh token identifier per user so
//! that a rotated or compromised refresh token becomes unusable. The
//! check-and-rotate step is atomic under one write lock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Store of valid refresh token identifiers, one per user
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + Debug {
    /// Register a refresh token identifier for a user, replacing any
    /// previously valid one. Called at login.
    async fn put(&self, user_id: &UserId, jti: &str) -> Result<(), DomainError>;

    /// Atomically verify that `presented` is the user's current identifier
    /// and rotate it to `replacement`. Returns false when the presented
    /// identifier is not current (already redeemed or revoked).
    async fn exchange(
        &self,
        user_id: &UserId,
        presented: &str,
        replacement: &str,
    ) -> Result<bool, DomainError>;

    /// Revoke the user's refresh token identifier. Called at logout.
    async fn revoke(&self, user_id: &UserId) -> Result<(), DomainError>;

    /// Check whether an identifier is the user's current one
    async fn is_current(&self, user_id: &UserId, jti: &str) -> Result<bool, DomainError>;
}

/// In-memory implementation of RefreshTokenStore
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStore {
    current: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryRefreshTokenStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn put(&self, user_id: &UserId, jti: &str) -> Result<(), DomainError> {
        let mut current = self.current.write().await;
        current.insert(user_id.as_str().to_string(), jti.to_string());
        Ok(())
    }

    async fn exchange(
        &self,
        user_id: &UserId,
        presented: &str,
        replacement: &str,
    ) -> Result<bool, DomainError> {
        let mut current = self.current.write().await;

        match current.get(user_id.as_str()) {
            Some(jti) if jti == presented => {
                current.insert(user_id.as_str().to_string(), replacement.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke(&self, user_id: &UserId) -> Result<(), DomainError> {
        let mut current = self.current.write().await;
        current.remove(user_id.as_str());
        Ok(())
    }

    async fn is_current(&self, user_id: &UserId, jti: &str) -> Result<bool, DomainError> {
        let current = self.current.read().await;
        Ok(current.get(user_id.as_str()).map(String::as_str) == Some(jti))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_id() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[tokio::test]
    async fn test_put_and_is_current() {
        let store = InMemoryRefreshTokenStore::new();
        let id = user_id();

        store.put(&id, "jti-1").await.unwrap();

        assert!(store.is_current(&id, "jti-1").await.unwrap());
        assert!(!store.is_current(&id, "jti-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_exchange_rotates() {
        let store = InMemoryRefreshTokenStore::new();
        let id = user_id();

        store.put(&id, "jti-1").await.unwrap();

        let rotated = store.exchange(&id, "jti-1", "jti-2").await.unwrap();
        assert!(rotated);

        assert!(store.is_current(&id, "jti-2").await.unwrap());
        assert!(!store.is_current(&id, "jti-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_redeemed_token_cannot_be_reused() {
        let store = InMemoryRefreshTokenStore::new();
        let id = user_id();

        store.put(&id, "jti-1").await.unwrap();
        store.exchange(&id, "jti-1", "jti-2").await.unwrap();

        // Presenting the already redeemed identifier again must fail
        let reused = store.exchange(&id, "jti-1", "jti-3").await.unwrap();
        assert!(!reused);

        // The rotation from the failed attempt must not have happened
        assert!(store.is_current(&id, "jti-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_exchange_unknown_user_fails() {
        let store = InMemoryRefreshTokenStore::new();

        let rotated = store.exchange(&user_id(), "jti-1", "jti-2").await.unwrap();
        assert!(!rotated);
    }

    #[tokio::test]
    async fn test_revoke() {
        let store = InMemoryRefreshTokenStore::new();
        let id = user_id();

        store.put(&id, "jti-1").await.unwrap();
        store.revoke(&id).await.unwrap();

        assert!(!store.is_current(&id, "jti-1").await.unwrap());
        assert!(!store.exchange(&id, "jti-1", "jti-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_login_replaces_previous_token() {
        let store = InMemoryRefreshTokenStore::new();
        let id = user_id();

        store.put(&id, "jti-1").await.unwrap();
        store.put(&id, "jti-2").await.unwrap();

        assert!(!store.is_current(&id, "jti-1").await.unwrap());
        assert!(store.is_current(&id, "jti-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_exchange_single_winner() {
        let store = Arc::new(InMemoryRefreshTokenStore::new());
        let id = user_id();

        store.put(&id, "jti-1").await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                store
                    .exchange(&id, "jti-1", &format!("jti-new-{}", i))
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        // Exactly one concurrent redemption of the same token may succeed
        assert_eq!(winners, 1);
    }
}
