//! In-memory task repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::task::{Task, TaskFilter, TaskId, TaskRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// In-memory implementation of TaskRepository
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<String, Task>>>,
}

impl InMemoryTaskRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn get(&self, id: &TaskId) -> Result<Option<Task>, DomainError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(id.as_str()).cloned())
    }

    async fn create(&self, task: Task) -> Result<Task, DomainError> {
        let mut tasks = self.tasks.write().await;

        let id = task.id().as_str().to_string();

        if tasks.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Task with ID '{}' already exists",
                id
            )));
        }

        tasks.insert(id, task.clone());

        Ok(task)
    }

    async fn update(&self, task: &Task) -> Result<Task, DomainError> {
        let mut tasks = self.tasks.write().await;

        let id = task.id().as_str().to_string();

        if !tasks.contains_key(&id) {
            return Err(DomainError::not_found(format!("Task '{}' not found", id)));
        }

        tasks.insert(id, task.clone());

        Ok(task.clone())
    }

    async fn delete(&self, id: &TaskId) -> Result<bool, DomainError> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.remove(id.as_str()).is_some())
    }

    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        filter: &TaskFilter,
    ) -> Result<Vec<Task>, DomainError> {
        let tasks = self.tasks.read().await;

        let mut result: Vec<Task> = tasks
            .values()
            .filter(|t| t.owner_id() == owner_id && filter.matches(t))
            .cloned()
            .collect();

        result.sort_by(|a, b| a.created_at().cmp(&b.created_at()));

        Ok(result)
    }

    async fn list_all(&self, filter: &TaskFilter) -> Result<Vec<Task>, DomainError> {
        let tasks = self.tasks.read().await;

        let mut result: Vec<Task> = tasks
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();

        result.sort_by(|a, b| a.created_at().cmp(&b.created_at()));

        Ok(result)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let tasks = self.tasks.read().await;
        Ok(tasks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::TaskStatus;

    fn create_test_task(title: &str, owner: &str) -> Task {
        Task::new(TaskId::generate(), title, UserId::new(owner).unwrap())
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryTaskRepository::new();
        let task = create_test_task("Write report", "owner-1");

        repo.create(task.clone()).await.unwrap();

        let retrieved = repo.get(task.id()).await.unwrap();
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().title(), "Write report");
    }

    #[tokio::test]
    async fn test_update() {
        let repo = InMemoryTaskRepository::new();
        let mut task = create_test_task("Write report", "owner-1");

        repo.create(task.clone()).await.unwrap();

        task.set_status(TaskStatus::Completed);
        repo.update(&task).await.unwrap();

        let retrieved = repo.get(task.id()).await.unwrap().unwrap();
        assert_eq!(retrieved.status(), TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_missing_task() {
        let repo = InMemoryTaskRepository::new();
        let task = create_test_task("Write report", "owner-1");

        let result = repo.update(&task).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryTaskRepository::new();
        let task = create_test_task("Write report", "owner-1");

        repo.create(task.clone()).await.unwrap();

        assert!(repo.delete(task.id()).await.unwrap());
        assert!(!repo.delete(task.id()).await.unwrap());
        assert!(repo.get(task.id()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_owner_is_scoped() {
        let repo = InMemoryTaskRepository::new();

        repo.create(create_test_task("Task A", "owner-1"))
            .await
            .unwrap();
        repo.create(create_test_task("Task B", "owner-1"))
            .await
            .unwrap();
        repo.create(create_test_task("Task C", "owner-2"))
            .await
            .unwrap();

        let owner1 = UserId::new("owner-1").unwrap();
        let tasks = repo
            .list_by_owner(&owner1, &TaskFilter::default())
            .await
            .unwrap();
        assert_eq!(tasks.len(), 2);

        let all = repo.list_all(&TaskFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_list_with_filter() {
        let repo = InMemoryTaskRepository::new();

        let mut done = create_test_task("Done task", "owner-1");
        done.set_status(TaskStatus::Completed);
        repo.create(done).await.unwrap();
        repo.create(create_test_task("Open task", "owner-1"))
            .await
            .unwrap();

        let owner = UserId::new("owner-1").unwrap();
        let filter = TaskFilter {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };

        let tasks = repo.list_by_owner(&owner, &filter).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title(), "Done task");
    }
}
