//! Task CRUD endpoints, owner-scoped

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{RequireManager, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::task::{Task, TaskFilter, TaskPriority, TaskStatus};
use crate::infrastructure::task::{CreateTaskRequest, UpdateTaskRequest};

/// Query parameters for task listings
#[derive(Debug, Deserialize, Default)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category: Option<String>,
}

/// Task creation request body
#[derive(Debug, Deserialize)]
pub struct CreateTaskBody {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Task update request body. Absent fields are left untouched; fields
/// set to null clear the value.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateTaskBody {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Distinguish "field absent" (outer None via default) from
/// "field set to null" (inner None)
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// Task response
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub due_date: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub owner_id: String,
}

impl TaskResponse {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id().as_str().to_string(),
            title: task.title().to_string(),
            description: task.description().map(|d| d.to_string()),
            priority: task.priority(),
            status: task.status(),
            category: task.category().map(|c| c.to_string()),
            tags: task.tags().to_vec(),
            due_date: task.due_date().map(|t| t.to_rfc3339()),
            completed_at: task.completed_at().map(|t| t.to_rfc3339()),
            created_at: task.created_at().to_rfc3339(),
            updated_at: task.updated_at().to_rfc3339(),
            owner_id: task.owner_id().as_str().to_string(),
        }
    }
}

impl From<TaskListQuery> for TaskFilter {
    fn from(query: TaskListQuery) -> Self {
        TaskFilter {
            status: query.status,
            priority: query.priority,
            category: query.category,
        }
    }
}

/// List the authenticated user's tasks
///
/// GET /v1/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state.task_service.list(&user, &query.into()).await?;

    Ok(Json(tasks.iter().map(TaskResponse::from_task).collect()))
}

/// List every user's tasks. Managers and admins only.
///
/// GET /v1/team/tasks
pub async fn list_team_tasks(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state.task_service.list_all(&user, &query.into()).await?;

    Ok(Json(tasks.iter().map(TaskResponse::from_task).collect()))
}

/// Create a task owned by the authenticated user
///
/// POST /v1/tasks
pub async fn create_task(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<CreateTaskBody>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let task = state
        .task_service
        .create(
            &user,
            CreateTaskRequest {
                title: body.title,
                description: body.description,
                priority: body.priority,
                category: body.category,
                tags: body.tags,
                due_date: body.due_date,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from_task(&task))))
}

/// Get a single task
///
/// GET /v1/tasks/{task_id}
pub async fn get_task(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.task_service.get(&user, &task_id).await?;

    Ok(Json(TaskResponse::from_task(&task)))
}

/// Update a task
///
/// PATCH /v1/tasks/{task_id}
pub async fn update_task(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(task_id): Path<String>,
    Json(body): Json<UpdateTaskBody>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state
        .task_service
        .update(
            &user,
            &task_id,
            UpdateTaskRequest {
                title: body.title,
                description: body.description,
                priority: body.priority,
                status: body.status,
                category: body.category,
                tags: body.tags,
                due_date: body.due_date,
            },
        )
        .await?;

    Ok(Json(TaskResponse::from_task(&task)))
}

/// Delete a task
///
/// DELETE /v1/tasks/{task_id}
pub async fn delete_task(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(task_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.task_service.delete(&user, &task_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
