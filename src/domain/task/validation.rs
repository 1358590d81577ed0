//! Task validation utilities

use thiserror::Error;

/// Errors that can occur during task validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TaskValidationError {
    #[error("Task ID cannot be empty")]
    EmptyId,

    #[error("Task ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("Task ID contains invalid character: '{0}'. Only alphanumeric characters and hyphens are allowed")]
    InvalidIdCharacter(char),

    #[error("Title cannot be empty")]
    EmptyTitle,

    #[error("Title exceeds maximum length of {0} characters")]
    TitleTooLong(usize),

    #[error("Category exceeds maximum length of {0} characters")]
    CategoryTooLong(usize),

    #[error("Too many tags. Maximum is {0}")]
    TooManyTags(usize),
}

const MAX_TASK_ID_LENGTH: usize = 50;
const MAX_TITLE_LENGTH: usize = 255;
const MAX_CATEGORY_LENGTH: usize = 100;
const MAX_TAGS: usize = 20;

/// Validate a task ID
pub fn validate_task_id(id: &str) -> Result<(), TaskValidationError> {
    if id.is_empty() {
        return Err(TaskValidationError::EmptyId);
    }

    if id.len() > MAX_TASK_ID_LENGTH {
        return Err(TaskValidationError::IdTooLong(MAX_TASK_ID_LENGTH));
    }

    for c in id.chars() {
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(TaskValidationError::InvalidIdCharacter(c));
        }
    }

    Ok(())
}

/// Validate a task title
pub fn validate_title(title: &str) -> Result<(), TaskValidationError> {
    if title.trim().is_empty() {
        return Err(TaskValidationError::EmptyTitle);
    }

    if title.len() > MAX_TITLE_LENGTH {
        return Err(TaskValidationError::TitleTooLong(MAX_TITLE_LENGTH));
    }

    Ok(())
}

/// Validate an optional category label
pub fn validate_category(category: &str) -> Result<(), TaskValidationError> {
    if category.len() > MAX_CATEGORY_LENGTH {
        return Err(TaskValidationError::CategoryTooLong(MAX_CATEGORY_LENGTH));
    }

    Ok(())
}

/// Validate a tag list
pub fn validate_tags(tags: &[String]) -> Result<(), TaskValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(TaskValidationError::TooManyTags(MAX_TAGS));
    }

    Ok(())
}
