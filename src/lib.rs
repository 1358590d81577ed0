//! Taskhub
//!
//! A task-management API with JWT-based authentication:
//! - stateless access/refresh token issuance with server-side refresh
//!   rotation
//! - role-guarded routes (user, manager, admin) over owner-scoped tasks
//! - a global fixed-window rate limiter ahead of every route
//! - a typed client with a durable session store and transparent
//!   single-flight token refresh

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use tracing::info;

use api::state::AppState;
use domain::user::{Role, UserRepository};
use infrastructure::auth::{InMemoryRefreshTokenStore, RefreshTokenStore, TokenConfig, TokenService};
use infrastructure::rate_limit::{FixedWindowLimiter, RateLimitConfig};
use infrastructure::task::{InMemoryTaskRepository, TaskService};
use infrastructure::user::{Argon2Hasher, CreateUserRequest, InMemoryUserRepository, UserService};

/// Create the application state with all services initialized
///
/// Fails when the signing secret is absent: there is no fallback value.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let secret = config
        .auth
        .secret
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "auth.secret is required: set it in config/local or via APP__AUTH__SECRET"
            )
        })?;

    let token_service = Arc::new(TokenService::new(TokenConfig::new(
        secret,
        config.auth.access_token_minutes,
        config.auth.refresh_token_days,
    )));

    let user_repository: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
    let user_service = Arc::new(UserService::new(
        user_repository,
        Arc::new(Argon2Hasher::new()),
    ));

    let task_service = Arc::new(TaskService::new(Arc::new(InMemoryTaskRepository::new())));

    let refresh_tokens: Arc<dyn RefreshTokenStore> = Arc::new(InMemoryRefreshTokenStore::new());

    let rate_limiter = Arc::new(FixedWindowLimiter::new(RateLimitConfig {
        max_requests: config.rate_limit.max_requests,
        window_secs: config.rate_limit.window_secs,
    }));

    bootstrap_admin(config, &user_service).await?;

    Ok(AppState {
        user_service,
        task_service,
        token_service,
        refresh_tokens,
        rate_limiter,
    })
}

/// Create the configured first admin account, when one is requested
async fn bootstrap_admin(config: &AppConfig, users: &UserService) -> anyhow::Result<()> {
    let (Some(username), Some(email), Some(password)) = (
        config.auth.bootstrap_admin_username.clone(),
        config.auth.bootstrap_admin_email.clone(),
        config.auth.bootstrap_admin_password.clone(),
    ) else {
        return Ok(());
    };

    let admin = users
        .create(CreateUserRequest {
            username: username.clone(),
            email,
            full_name: "Administrator".to_string(),
            password,
            role: Role::Admin,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create bootstrap admin: {}", e))?;

    info!(user_id = %admin.id(), username = %username, "Bootstrap admin created");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_secret() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.secret = Some("test-secret-key-12345".to_string());
        config
    }

    #[tokio::test]
    async fn test_create_app_state() {
        let state = create_app_state(&config_with_secret()).await.unwrap();

        assert_eq!(state.user_service.count(None).await.unwrap(), 0);
        assert_eq!(state.task_service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_secret_fails_startup() {
        let config = AppConfig::default();

        let result = create_app_state(&config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("auth.secret"));
    }

    #[tokio::test]
    async fn test_empty_secret_fails_startup() {
        let mut config = AppConfig::default();
        config.auth.secret = Some(String::new());

        let result = create_app_state(&config).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_bootstrap_admin_created() {
        let mut config = config_with_secret();
        config.auth.bootstrap_admin_username = Some("root".to_string());
        config.auth.bootstrap_admin_email = Some("root@example.com".to_string());
        config.auth.bootstrap_admin_password = Some("super-secret-pw".to_string());

        let state = create_app_state(&config).await.unwrap();

        let admin = state
            .user_service
            .get_by_username("root")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role(), Role::Admin);
    }
}
