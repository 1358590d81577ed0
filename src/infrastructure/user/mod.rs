//! User infrastructure - password hashing, storage, and the user service

mod password;
mod repository;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use repository::InMemoryUserRepository;
pub use service::{CreateUserRequest, UpdatePasswordRequest, UpdateProfileRequest, UserService};
