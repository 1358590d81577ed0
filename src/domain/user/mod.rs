//! User domain
//!
//! This module provides domain types and traits for user authentication
//! and authorization, including the user entity, role enumeration,
//! validation, and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{Role, User, UserId, UserStatus};
pub use repository::UserRepository;
pub use validation::{
    validate_email, validate_password, validate_user_id, validate_username, UserValidationError,
};
