//! Typed API client with transparent token refresh
//!
//! Every outbound request attaches the current access token as a bearer
//! header. A 401 response triggers exactly one silent refresh exchange
//! followed by exactly one re-dispatch of the original request; a second
//! 401 fails the request. Concurrent 401s share a single refresh exchange
//! through a mutex-guarded single-flight gate. When no refresh token
//! exists or the exchange fails, the session is cleared and the caller
//! sees `ClientError::SessionExpired` - its cue to route to the login
//! surface.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::session::{SessionStore, SessionUser};

/// Default HTTP request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default API base URL for local development
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Create a configuration for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read the base URL from the `API_BASE_URL` environment variable
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

/// Client-side error taxonomy
///
/// Everything except the silently retried 401 is meant to be surfaced to
/// the user by the embedding UI. `SessionExpired` is terminal: the
/// session has already been cleared.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Session expired - login required")]
    SessionExpired,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    fn from_status(status: StatusCode, body: &str) -> Self {
        let message = error_message(body);

        match status.as_u16() {
            400 | 422 => ClientError::Validation(message),
            401 => ClientError::Unauthorized,
            403 => ClientError::AccessDenied(message),
            404 => ClientError::NotFound(message),
            429 => ClientError::RateLimited,
            500..=599 => ClientError::Server(message),
            _ => ClientError::InvalidResponse(format!("Status {}: {}", status, message)),
        }
    }
}

/// Pull the message out of an API error body, falling back to the
/// truncated raw body
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value["error"]["message"].as_str() {
            return message.to_string();
        }
    }

    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..MAX_ERROR_BODY_LENGTH],
            body.len()
        )
    }
}

/// Registration request payload
#[derive(Debug, Clone, Serialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

/// Profile update payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    access_token: String,
    refresh_token: String,
    user: SessionUser,
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: String,
    refresh_token: String,
}

/// API client holding an explicit session store.
/// Clone is cheap - reqwest::Client uses Arc internally for connection
/// pooling, and the session store is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    /// Single-flight gate: concurrent 401s await one refresh exchange
    refresh_gate: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a new API client around an existing session store
    pub fn new(config: ClientConfig, session: Arc<SessionStore>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            refresh_gate: Arc::new(Mutex::new(())),
        })
    }

    /// The session store this client operates on
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Register a new account. Does not log in.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<SessionUser, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(payload)
            .send()
            .await?;

        Self::read_success(response).await
    }

    /// Login and populate the session store
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionUser, ClientError> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        let payload: LoginPayload = Self::read_success(response).await?;

        self.session
            .set_auth(
                payload.user.clone(),
                payload.access_token,
                payload.refresh_token,
            )
            .await
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        Ok(payload.user)
    }

    /// Logout: best-effort server-side revocation, then clear the session.
    /// The local session is cleared even when the server call fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Some(token) = self.session.access_token().await {
            if let Err(e) = self
                .http
                .post(self.url("/auth/logout"))
                .bearer_auth(token)
                .send()
                .await
            {
                warn!(error = %e, "Server-side logout failed, clearing session anyway");
            }
        }

        self.session
            .logout()
            .await
            .map_err(|e| ClientError::Storage(e.to_string()))
    }

    /// Update the authenticated user's profile and refresh the session's
    /// identity snapshot
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<SessionUser, ClientError> {
        let user: SessionUser = self.patch("/v1/users/me", update).await?;

        self.session
            .update_user(user.clone())
            .await
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        Ok(user)
    }

    /// GET a JSON resource
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send_json(Method::GET, path, None::<&()>).await
    }

    /// POST a JSON body and parse the JSON response
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(Method::POST, path, Some(body)).await
    }

    /// PATCH a JSON body and parse the JSON response
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(Method::PATCH, path, Some(body)).await
    }

    /// PUT a JSON body and parse the JSON response
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(Method::PUT, path, Some(body)).await
    }

    /// DELETE a resource
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let response = self.execute(Method::DELETE, path, None::<&()>).await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_status(status, &body))
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let response = self.execute(method, path, body).await?;
        Self::read_success(response).await
    }

    /// Dispatch a request, recovering from a single 401 via the refresh
    /// exchange. The original request is re-dispatched exactly once; a
    /// second 401 surfaces as an error.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response, ClientError> {
        let initial_token = self.session.access_token().await;
        let response = self
            .dispatch(method.clone(), path, body, initial_token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path = path, "Received 401, attempting token refresh");

        let fresh_token = self
            .refresh_after_unauthorized(initial_token.as_deref())
            .await?;

        self.dispatch(method, path, body, Some(&fresh_token)).await
    }

    async fn dispatch<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self.http.request(method, self.url(path));

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Redeem the refresh token for a rotated pair, shared across
    /// concurrent waiters. `stale_access` is the token the failed request
    /// carried; a waiter that acquires the gate after the pair already
    /// rotated reuses the new token instead of redeeming again.
    async fn refresh_after_unauthorized(
        &self,
        stale_access: Option<&str>,
    ) -> Result<String, ClientError> {
        let _gate = self.refresh_gate.lock().await;

        if let Some(current) = self.session.access_token().await {
            if stale_access != Some(current.as_str()) {
                debug!("Tokens already rotated by another request");
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.session.refresh_token().await else {
            self.force_logout().await?;
            return Err(ClientError::SessionExpired);
        };

        let response = match self
            .http
            .post(self.url("/auth/refresh"))
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Refresh exchange failed");
                self.force_logout().await?;
                return Err(ClientError::SessionExpired);
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "Refresh token rejected");
            self.force_logout().await?;
            return Err(ClientError::SessionExpired);
        }

        let tokens: TokenPayload = match response.json().await {
            Ok(tokens) => tokens,
            Err(_) => {
                self.force_logout().await?;
                return Err(ClientError::SessionExpired);
            }
        };

        self.session
            .update_tokens(tokens.access_token.clone(), tokens.refresh_token)
            .await
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        Ok(tokens.access_token)
    }

    async fn force_logout(&self) -> Result<(), ClientError> {
        self.session
            .logout()
            .await
            .map_err(|e| ClientError::Storage(e.to_string()))
    }

    async fn read_success<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ClientError::from_status(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| ClientError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
