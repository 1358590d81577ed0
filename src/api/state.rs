//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::auth::{RefreshTokenStore, TokenService};
use crate::infrastructure::rate_limit::FixedWindowLimiter;
use crate::infrastructure::task::TaskService;
use crate::infrastructure::user::UserService;

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub task_service: Arc<TaskService>,
    pub token_service: Arc<TokenService>,
    pub refresh_tokens: Arc<dyn RefreshTokenStore>,
    pub rate_limiter: Arc<FixedWindowLimiter>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
