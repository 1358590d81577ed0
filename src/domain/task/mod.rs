//! Task domain
//!
//! Tasks are the protected resource the authorization guards exist for:
//! owner-scoped for regular users, fully visible to admins.

mod entity;
mod repository;
mod validation;

pub use entity::{Task, TaskId, TaskPriority, TaskStatus};
pub use repository::{TaskFilter, TaskRepository};
pub use validation::{
    validate_category, validate_tags, validate_task_id, validate_title, TaskValidationError,
};
