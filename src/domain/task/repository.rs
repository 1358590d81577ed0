//! Task repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Task, TaskId, TaskPriority, TaskStatus};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Filter applied to task listings
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category: Option<String>,
}

impl TaskFilter {
    /// Check whether a task matches this filter
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status() != status {
                return false;
            }
        }

        if let Some(priority) = self.priority {
            if task.priority() != priority {
                return false;
            }
        }

        if let Some(ref category) = self.category {
            if task.category() != Some(category.as_str()) {
                return false;
            }
        }

        true
    }
}

/// Repository trait for task storage
#[async_trait]
pub trait TaskRepository: Send + Sync + Debug {
    /// Get a task by its ID
    async fn get(&self, id: &TaskId) -> Result<Option<Task>, DomainError>;

    /// Create a new task
    async fn create(&self, task: Task) -> Result<Task, DomainError>;

    /// Update an existing task
    async fn update(&self, task: &Task) -> Result<Task, DomainError>;

    /// Delete a task
    async fn delete(&self, id: &TaskId) -> Result<bool, DomainError>;

    /// List tasks owned by a user, filtered
    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, DomainError>;

    /// List all tasks, filtered
    async fn list_all(&self, filter: &TaskFilter) -> Result<Vec<Task>, DomainError>;

    /// Count all tasks
    async fn count(&self) -> Result<usize, DomainError>;
}
