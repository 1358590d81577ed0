//! User service for registration, authentication, and account management

use std::sync::Arc;

use crate::domain::user::{
    validate_email, validate_password, validate_username, Role, User, UserId, UserRepository,
    UserStatus,
};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role: Role,
}

/// Request for updating a user's profile
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// Request for updating a user's password
#[derive(Debug, Clone)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// User service for authentication and account management
#[derive(Debug)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    /// Create a new user service
    pub fn new(repository: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, DomainError> {
        validate_username(&request.username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_email(&request.email).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        if self.repository.username_exists(&request.username).await? {
            return Err(DomainError::conflict(format!(
                "Username '{}' already taken",
                request.username
            )));
        }

        if self.repository.email_exists(&request.email).await? {
            return Err(DomainError::conflict(format!(
                "Email '{}' already registered",
                request.email
            )));
        }

        let password_hash = self.hasher.hash(&request.password)?;

        let user = User::new(
            UserId::generate(),
            &request.username,
            &request.email,
            &request.full_name,
            password_hash,
            request.role,
        );

        self.repository.create(user).await
    }

    /// Authenticate a user with username and password
    ///
    /// Returns `None` uniformly for unknown usernames, wrong passwords, and
    /// deactivated accounts. The active check runs before password
    /// verification, so a deactivated account fails regardless of password
    /// correctness.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let user = match self.repository.get_by_username(username).await? {
            Some(u) => u,
            None => return Ok(None),
        };

        if !user.is_active() {
            return Ok(None);
        }

        if !self.hasher.verify(password, user.password_hash()) {
            return Ok(None);
        }

        self.repository.record_login(user.id()).await?;

        // Re-fetch to pick up the recorded last_login_at
        self.repository.get(user.id()).await
    }

    /// Get a user by ID
    pub async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        let user_id = UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.repository.get(&user_id).await
    }

    /// Get a user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.repository.get_by_username(username).await
    }

    /// List all users (optionally filtered by status)
    pub async fn list(&self, status: Option<UserStatus>) -> Result<Vec<User>, DomainError> {
        self.repository.list(status).await
    }

    /// Count users (optionally filtered by status)
    pub async fn count(&self, status: Option<UserStatus>) -> Result<usize, DomainError> {
        self.repository.count(status).await
    }

    /// Update a user's profile (display name and/or email)
    pub async fn update_profile(
        &self,
        id: &str,
        request: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.get_required(id).await?;

        if let Some(email) = request.email {
            validate_email(&email).map_err(|e| DomainError::validation(e.to_string()))?;

            if email != user.email() && self.repository.email_exists(&email).await? {
                return Err(DomainError::conflict(format!(
                    "Email '{}' already registered",
                    email
                )));
            }

            if email != user.email() {
                user.set_email(email);
            }
        }

        if let Some(full_name) = request.full_name {
            user.set_full_name(full_name);
        }

        self.repository.update(&user).await
    }

    /// Update a user's password after verifying the current one
    pub async fn update_password(
        &self,
        id: &str,
        request: UpdatePasswordRequest,
    ) -> Result<User, DomainError> {
        let mut user = self.get_required(id).await?;

        if !self
            .hasher
            .verify(&request.current_password, user.password_hash())
        {
            return Err(DomainError::validation("Current password is incorrect"));
        }

        validate_password(&request.new_password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let new_hash = self.hasher.hash(&request.new_password)?;
        user.set_password_hash(new_hash);

        self.repository.update(&user).await
    }

    /// Change a user's role (admin operation)
    pub async fn set_role(&self, id: &str, role: Role) -> Result<User, DomainError> {
        let mut user = self.get_required(id).await?;

        user.set_role(role);

        self.repository.update(&user).await
    }

    /// Soft-deactivate a user (admin operation)
    pub async fn deactivate(&self, id: &str) -> Result<User, DomainError> {
        let mut user = self.get_required(id).await?;

        user.deactivate();

        self.repository.update(&user).await
    }

    /// Reactivate a deactivated user (admin operation)
    pub async fn activate(&self, id: &str) -> Result<User, DomainError> {
        let mut user = self.get_required(id).await?;

        user.activate();

        self.repository.update(&user).await
    }

    async fn get_required(&self, id: &str) -> Result<User, DomainError> {
        let user_id = UserId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        self.repository
            .get(&user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))
    }
}
