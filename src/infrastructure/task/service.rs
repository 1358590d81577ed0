//! Task service with owner-scoped access control

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::task::{
    validate_category, validate_tags, validate_title, Task, TaskFilter, TaskId, TaskPriority,
    TaskRepository, TaskStatus,
};
use crate::domain::user::{Role, User};
use crate::domain::DomainError;

/// Request for creating a task
#[derive(Debug, Clone)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Request for updating a task. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Task service enforcing ownership
///
/// Regular users may only touch their own tasks; admins may touch any.
#[derive(Debug)]
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
}

impl TaskService {
    /// Create a new task service
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    /// Create a task owned by the requesting user
    pub async fn create(
        &self,
        owner: &User,
        request: CreateTaskRequest,
    ) -> Result<Task, DomainError> {
        validate_title(&request.title).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_tags(&request.tags).map_err(|e| DomainError::validation(e.to_string()))?;

        if let Some(ref category) = request.category {
            validate_category(category).map_err(|e| DomainError::validation(e.to_string()))?;
        }

        let mut task = Task::new(TaskId::generate(), request.title, owner.id().clone());
        task.set_description(request.description);
        task.set_tags(request.tags);
        task.set_category(request.category);
        task.set_due_date(request.due_date);

        if let Some(priority) = request.priority {
            task.set_priority(priority);
        }

        self.repository.create(task).await
    }

    /// Get a task, enforcing ownership
    pub async fn get(&self, requester: &User, id: &str) -> Result<Task, DomainError> {
        let task = self.get_required(id).await?;

        self.check_access(requester, &task)?;

        Ok(task)
    }

    /// List tasks owned by the requester
    pub async fn list(&self, requester: &User, filter: &TaskFilter) -> Result<Vec<Task>, DomainError> {
        self.repository.list_by_owner(requester.id(), filter).await
    }

    /// List every task regardless of owner. Managers and admins oversee
    /// the full board; mutation still requires ownership or admin.
    pub async fn list_all(
        &self,
        requester: &User,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, DomainError> {
        if !requester.role().grants(Role::Manager) {
            return Err(DomainError::forbidden("Manager role required"));
        }

        self.repository.list_all(filter).await
    }

    /// Update a task, enforcing ownership
    pub async fn update(
        &self,
        requester: &User,
        id: &str,
        request: UpdateTaskRequest,
    ) -> Result<Task, DomainError> {
        let mut task = self.get_required(id).await?;

        self.check_access(requester, &task)?;

        if let Some(title) = request.title {
            validate_title(&title).map_err(|e| DomainError::validation(e.to_string()))?;
            task.set_title(title);
        }

        if let Some(description) = request.description {
            task.set_description(description);
        }

        if let Some(priority) = request.priority {
            task.set_priority(priority);
        }

        if let Some(status) = request.status {
            task.set_status(status);
        }

        if let Some(category) = request.category {
            if let Some(ref value) = category {
                validate_category(value).map_err(|e| DomainError::validation(e.to_string()))?;
            }
            task.set_category(category);
        }

        if let Some(tags) = request.tags {
            validate_tags(&tags).map_err(|e| DomainError::validation(e.to_string()))?;
            task.set_tags(tags);
        }

        if let Some(due_date) = request.due_date {
            task.set_due_date(due_date);
        }

        self.repository.update(&task).await
    }

    /// Delete a task, enforcing ownership
    pub async fn delete(&self, requester: &User, id: &str) -> Result<bool, DomainError> {
        let task = self.get_required(id).await?;

        self.check_access(requester, &task)?;

        self.repository.delete(task.id()).await
    }

    /// Count all tasks (used by readiness checks)
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }

    /// Admins can access any task, regular users only their own
    fn check_access(&self, requester: &User, task: &Task) -> Result<(), DomainError> {
        if requester.role().grants(Role::Admin) || requester.id() == task.owner_id() {
            Ok(())
        } else {
            Err(DomainError::forbidden("Not the task owner"))
        }
    }

    async fn get_required(&self, id: &str) -> Result<Task, DomainError> {
        let task_id = TaskId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        self.repository
            .get(&task_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Task '{}' not found", id)))
    }
}
