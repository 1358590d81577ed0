//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_user_id, UserValidationError};

/// User identifier - alphanumeric + hyphens, max 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random UserId
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a user, ordered by privilege
///
/// `Admin` outranks `Manager`, which outranks `User`. Guards compare with
/// `grants`, so an admin satisfies a manager requirement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Manager,
    Admin,
}

impl Role {
    /// Check if this role matches or outranks the required role
    pub fn grants(&self, required: Role) -> bool {
        *self >= required
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Manager => write!(f, "manager"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// Status of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// User is active and can log in
    #[default]
    Active,
    /// User has been soft-deactivated by an admin
    Deactivated,
}

impl UserStatus {
    /// Check if the user can log in
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// User entity for authentication and authorization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    id: UserId,
    /// Username for login (globally unique)
    username: String,
    /// Email address (globally unique)
    email: String,
    /// Display name
    full_name: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    /// Role used for authorization decisions
    role: Role,
    /// Current status of the account
    status: UserStatus,
    /// Whether the email address has been verified
    is_verified: bool,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
    /// Last login timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new user with the default role and active status
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            username: username.into(),
            email: email.into(),
            full_name: full_name.into(),
            password_hash: password_hash.into(),
            role,
            status: UserStatus::Active,
            is_verified: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    // Status checks

    /// Check if the user is active and can log in
    pub fn is_active(&self) -> bool {
        self.status.can_login()
    }

    // Mutators

    /// Update the email address
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.is_verified = false;
        self.touch();
    }

    /// Update the display name
    pub fn set_full_name(&mut self, full_name: impl Into<String>) {
        self.full_name = full_name.into();
        self.touch();
    }

    /// Update the password hash
    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.touch();
    }

    /// Update the role
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.touch();
    }

    /// Mark the email address as verified
    pub fn mark_verified(&mut self) {
        self.is_verified = true;
        self.touch();
    }

    /// Record a login
    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
    }

    /// Soft-deactivate the user
    pub fn deactivate(&mut self) {
        self.status = UserStatus::Deactivated;
        self.touch();
    }

    /// Reactivate a deactivated user
    pub fn activate(&mut self) {
        if self.status == UserStatus::Deactivated {
            self.status = UserStatus::Active;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
