//! API middleware components

pub mod logging;
pub mod rate_limit;
pub mod security;
pub mod user_auth;

pub use logging::{logging_middleware, redact_json_sensitive_fields};
pub use rate_limit::rate_limit_middleware;
pub use security::security_headers_middleware;
pub use user_auth::{MaybeUser, RequireAdmin, RequireManager, RequireUser};
