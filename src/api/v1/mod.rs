//! Authenticated v1 API endpoints

pub mod tasks;
pub mod users;

use axum::{
    routing::{get, put},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(users::get_me).patch(users::update_me))
        .route("/users/me/password", put(users::change_password))
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/team/tasks", get(tasks::list_team_tasks))
        .route(
            "/tasks/{task_id}",
            get(tasks::get_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
}
