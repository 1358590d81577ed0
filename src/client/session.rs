//! Client session store
//!
//! Single source of truth for "who is logged in" on the client side. The
//! session tuple (identity snapshot, access token, refresh token,
//! authenticated flag) is serialized to a namespaced JSON file on every
//! mutation and rehydrated on construction, so it survives restarts. The
//! persisted blob carries no TTL of its own; the embedded token expiry is
//! the only time bound.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::warn;

use crate::domain::user::Role;

/// Session file name inside the store directory
const SESSION_FILE: &str = "session.json";

/// Identity snapshot held by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

/// The client-held session tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Session {
    pub user: Option<SessionUser>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// True iff both tokens were set together by a successful
    /// login or refresh
    pub authenticated: bool,
}

/// Durable session store
///
/// Constructed once at application start and passed explicitly to the
/// HTTP client and route guard. Every mutation is atomic over the fields
/// it touches and persists the full session before returning.
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    inner: RwLock<Session>,
}

impl SessionStore {
    /// Open a store backed by `dir/session.json`, rehydrating any
    /// previously persisted session. An unreadable or corrupt file starts
    /// the session empty rather than failing construction.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create session directory {}", dir.display()))?;

        let path = dir.join(SESSION_FILE);
        let session = if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                    warn!(error = %e, "Session file is corrupt, starting empty");
                    Session::default()
                }),
                Err(e) => {
                    warn!(error = %e, "Failed to read session file, starting empty");
                    Session::default()
                }
            }
        } else {
            Session::default()
        };

        Ok(Self {
            path: Some(path),
            inner: RwLock::new(session),
        })
    }

    /// Open a store in the platform data directory
    pub fn open_default() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine the platform data directory"))?
            .join("taskhub");
        Self::open(dir)
    }

    /// Create a store without persistence
    pub fn ephemeral() -> Self {
        Self {
            path: None,
            inner: RwLock::new(Session::default()),
        }
    }

    /// Set all session fields after a successful login
    pub async fn set_auth(
        &self,
        user: SessionUser,
        access_token: String,
        refresh_token: String,
    ) -> Result<()> {
        let mut session = self.inner.write().await;
        session.user = Some(user);
        session.access_token = Some(access_token);
        session.refresh_token = Some(refresh_token);
        session.authenticated = true;
        self.persist(&session)
    }

    /// Replace only the credential pair after a successful refresh
    pub async fn update_tokens(&self, access_token: String, refresh_token: String) -> Result<()> {
        let mut session = self.inner.write().await;
        session.access_token = Some(access_token);
        session.refresh_token = Some(refresh_token);
        self.persist(&session)
    }

    /// Replace only the identity snapshot after a profile edit
    pub async fn update_user(&self, user: SessionUser) -> Result<()> {
        let mut session = self.inner.write().await;
        session.user = Some(user);
        self.persist(&session)
    }

    /// Clear all session fields. Idempotent; callers are expected to
    /// redirect to the login surface afterwards.
    pub async fn logout(&self) -> Result<()> {
        let mut session = self.inner.write().await;
        *session = Session::default();
        self.persist(&session)
    }

    /// Current access token, if any
    pub async fn access_token(&self) -> Option<String> {
        self.inner.read().await.access_token.clone()
    }

    /// Current refresh token, if any
    pub async fn refresh_token(&self) -> Option<String> {
        self.inner.read().await.refresh_token.clone()
    }

    /// Current identity snapshot, if any
    pub async fn user(&self) -> Option<SessionUser> {
        self.inner.read().await.user.clone()
    }

    /// Whether a login or refresh established this session
    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.authenticated
    }

    /// Full copy of the current session
    pub async fn snapshot(&self) -> Session {
        self.inner.read().await.clone()
    }

    fn persist(&self, session: &Session) -> Result<()> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        let contents =
            serde_json::to_string_pretty(session).context("Failed to serialize session")?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write session file {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> SessionUser {
        SessionUser {
            id: "user-1".to_string(),
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            full_name: "Alice".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_set_auth_marks_authenticated() {
        let store = SessionStore::ephemeral();

        assert!(!store.is_authenticated().await);

        store
            .set_auth(sample_user(), "access-1".to_string(), "refresh-1".to_string())
            .await
            .unwrap();

        assert!(store.is_authenticated().await);
        assert_eq!(store.access_token().await.as_deref(), Some("access-1"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("refresh-1"));
        assert_eq!(store.user().await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_update_tokens_preserves_identity() {
        let store = SessionStore::ephemeral();

        store
            .set_auth(sample_user(), "access-1".to_string(), "refresh-1".to_string())
            .await
            .unwrap();

        store
            .update_tokens("access-2".to_string(), "refresh-2".to_string())
            .await
            .unwrap();

        assert_eq!(store.access_token().await.as_deref(), Some("access-2"));
        assert_eq!(store.refresh_token().await.as_deref(), Some("refresh-2"));
        assert!(store.is_authenticated().await);
        assert_eq!(store.user().await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_update_user_preserves_tokens() {
        let store = SessionStore::ephemeral();

        store
            .set_auth(sample_user(), "access-1".to_string(), "refresh-1".to_string())
            .await
            .unwrap();

        let mut renamed = sample_user();
        renamed.full_name = "Alice Cooper".to_string();
        store.update_user(renamed).await.unwrap();

        assert_eq!(store.user().await.unwrap().full_name, "Alice Cooper");
        assert_eq!(store.access_token().await.as_deref(), Some("access-1"));
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let store = SessionStore::ephemeral();

        store
            .set_auth(sample_user(), "access-1".to_string(), "refresh-1".to_string())
            .await
            .unwrap();
        store.logout().await.unwrap();

        let session = store.snapshot().await;
        assert!(session.user.is_none());
        assert!(session.access_token.is_none());
        assert!(session.refresh_token.is_none());
        assert!(!session.authenticated);
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let store = SessionStore::ephemeral();

        store
            .set_auth(sample_user(), "access-1".to_string(), "refresh-1".to_string())
            .await
            .unwrap();

        store.logout().await.unwrap();
        let after_first = store.snapshot().await;

        store.logout().await.unwrap();
        let after_second = store.snapshot().await;

        assert_eq!(after_first, after_second);
        assert_eq!(after_second, Session::default());
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = SessionStore::open(dir.path()).unwrap();
            store
                .set_auth(sample_user(), "access-1".to_string(), "refresh-1".to_string())
                .await
                .unwrap();
        }

        let reopened = SessionStore::open(dir.path()).unwrap();
        assert!(reopened.is_authenticated().await);
        assert_eq!(reopened.access_token().await.as_deref(), Some("access-1"));
        assert_eq!(reopened.user().await.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_logout_persists() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = SessionStore::open(dir.path()).unwrap();
            store
                .set_auth(sample_user(), "access-1".to_string(), "refresh-1".to_string())
                .await
                .unwrap();
            store.logout().await.unwrap();
        }

        let reopened = SessionStore::open(dir.path()).unwrap();
        assert!(!reopened.is_authenticated().await);
        assert!(reopened.access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "not json {").unwrap();

        let store = SessionStore::open(dir.path()).unwrap();
        assert!(!store.is_authenticated().await);
        assert!(store.user().await.is_none());
    }
}
