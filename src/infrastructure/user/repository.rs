//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository, UserStatus};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
    /// Index for username -> user ID lookup
    username_index: Arc<RwLock<HashMap<String, String>>>,
    /// Index for email -> user ID lookup
    email_index: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(id.as_str()).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let username_index = self.username_index.read().await;

        if let Some(user_id) = username_index.get(username) {
            let users = self.users.read().await;
            return Ok(users.get(user_id).cloned());
        }

        Ok(None)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email_index = self.email_index.read().await;

        if let Some(user_id) = email_index.get(email) {
            let users = self.users.read().await;
            return Ok(users.get(user_id).cloned());
        }

        Ok(None)
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut username_index = self.username_index.write().await;
        let mut email_index = self.email_index.write().await;

        let id = user.id().as_str().to_string();
        let username = user.username().to_string();
        let email = user.email().to_string();

        if users.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                id
            )));
        }

        if username_index.contains_key(&username) {
            return Err(DomainError::conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }

        if email_index.contains_key(&email) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already registered",
                email
            )));
        }

        username_index.insert(username, id.clone());
        email_index.insert(email, id.clone());
        users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut username_index = self.username_index.write().await;
        let mut email_index = self.email_index.write().await;

        let id = user.id().as_str().to_string();

        let Some(old_user) = users.get(&id) else {
            return Err(DomainError::not_found(format!("User '{}' not found", id)));
        };

        let old_username = old_user.username().to_string();
        let old_email = old_user.email().to_string();
        let new_username = user.username().to_string();
        let new_email = user.email().to_string();

        if old_username != new_username {
            if username_index.contains_key(&new_username) {
                return Err(DomainError::conflict(format!(
                    "Username '{}' already exists",
                    new_username
                )));
            }

            username_index.remove(&old_username);
            username_index.insert(new_username, id.clone());
        }

        if old_email != new_email {
            if email_index.contains_key(&new_email) {
                return Err(DomainError::conflict(format!(
                    "Email '{}' already registered",
                    new_email
                )));
            }

            email_index.remove(&old_email);
            email_index.insert(new_email, id.clone());
        }

        users.insert(id, user.clone());

        Ok(user.clone())
    }

    async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;

        let mut result: Vec<User> = users
            .values()
            .filter(|u| status.map(|s| u.status() == s).unwrap_or(true))
            .cloned()
            .collect();

        result.sort_by(|a, b| a.created_at().cmp(&b.created_at()));

        Ok(result)
    }

    async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError> {
        let users = self.users.read().await;

        let count = users
            .values()
            .filter(|u| status.map(|s| u.status() == s).unwrap_or(true))
            .count();

        Ok(count)
    }

    async fn record_login(&self, id: &UserId) -> Result<(), DomainError> {
        let mut users = self.users.write().await;

        if let Some(user) = users.get_mut(id.as_str()) {
            user.record_login();
            Ok(())
        } else {
            Err(DomainError::not_found(format!("User '{}' not found", id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::Role;

    fn create_test_user(id: &str, username: &str) -> User {
        let user_id = UserId::new(id).unwrap();
        User::new(
            user_id,
            username,
            format!("{}@example.com", username),
            "Test User",
            "hashed_password",
            Role::User,
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1", "alice");

        repo.create(user.clone()).await.unwrap();

        let retrieved = repo.get(user.id()).await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().username(), "alice");
    }

    #[tokio::test]
    async fn test_get_by_username() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1", "alice");

        repo.create(user).await.unwrap();

        let retrieved = repo.get_by_username("alice").await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().id().as_str(), "user-1");

        let not_found = repo.get_by_username("nonexistent").await.unwrap();
        assert!(not_found.is_none());
    }

    #[tokio::test]
    async fn test_get_by_email() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1", "alice");

        repo.create(user).await.unwrap();

        let retrieved = repo.get_by_email("alice@example.com").await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().id().as_str(), "user-1");
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let repo = InMemoryUserRepository::new();
        let user1 = create_test_user("user-1", "sameusername");
        let mut user2 = create_test_user("user-2", "sameusername");
        user2.set_email("other@example.com".to_string());

        repo.create(user1).await.unwrap();

        let result = repo.create(user2).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        let user1 = create_test_user("user-1", "alice");
        let mut user2 = create_test_user("user-2", "bob");
        user2.set_email("alice@example.com".to_string());

        repo.create(user1).await.unwrap();

        let result = repo.create(user2).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_update_email_reindexes() {
        let repo = InMemoryUserRepository::new();
        let mut user = create_test_user("user-1", "alice");

        repo.create(user.clone()).await.unwrap();

        user.set_email("fresh@example.com".to_string());
        repo.update(&user).await.unwrap();

        let old = repo.get_by_email("alice@example.com").await.unwrap();
        assert!(old.is_none());

        let new = repo.get_by_email("fresh@example.com").await.unwrap();
        assert!(new.is_some());
    }

    #[tokio::test]
    async fn test_update_email_conflict() {
        let repo = InMemoryUserRepository::new();
        let user1 = create_test_user("user-1", "alice");
        let mut user2 = create_test_user("user-2", "bob");

        repo.create(user1).await.unwrap();
        repo.create(user2.clone()).await.unwrap();

        user2.set_email("alice@example.com".to_string());

        let result = repo.update(&user2).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_and_count_by_status() {
        let repo = InMemoryUserRepository::new();

        repo.create(create_test_user("user-1", "alice"))
            .await
            .unwrap();

        let mut bob = create_test_user("user-2", "bob");
        bob.deactivate();
        repo.create(bob).await.unwrap();

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let active = repo.list(Some(UserStatus::Active)).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].username(), "alice");

        let deactivated = repo.count(Some(UserStatus::Deactivated)).await.unwrap();
        assert_eq!(deactivated, 1);
    }

    #[tokio::test]
    async fn test_record_login() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1", "alice");

        repo.create(user.clone()).await.unwrap();

        let before = repo.get(user.id()).await.unwrap().unwrap();
        assert!(before.last_login_at().is_none());

        repo.record_login(user.id()).await.unwrap();

        let after = repo.get(user.id()).await.unwrap().unwrap();
        assert!(after.last_login_at().is_some());
    }
}
