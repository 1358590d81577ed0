//! Request/response logging middleware with sensitive data redaction

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::info;

/// Middleware to log HTTP requests and responses with sensitive data
/// redaction. Does not open its own tracing span; `TraceLayer` already
/// handles span creation.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = extract_request_id(&request);
    let headers_log = redact_headers(&request);

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        headers = %headers_log,
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    response
}

fn extract_request_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Redact sensitive headers for logging
fn redact_headers(request: &Request<Body>) -> String {
    let mut parts = Vec::new();

    for (name, value) in request.headers() {
        let name_str = name.as_str().to_lowercase();

        if !should_log_header(&name_str) {
            continue;
        }

        let value_str = if is_sensitive_header(&name_str) {
            "[REDACTED]".to_string()
        } else {
            value.to_str().unwrap_or("[invalid]").to_string()
        };

        parts.push(format!("{}={}", name_str, value_str));
    }

    parts.join(", ")
}

/// Check if a header contains sensitive information
fn is_sensitive_header(name: &str) -> bool {
    matches!(
        name,
        "authorization" | "cookie" | "set-cookie" | "x-auth-token" | "proxy-authorization"
    )
}

/// Check if a header should be logged
fn should_log_header(name: &str) -> bool {
    matches!(
        name,
        "content-type"
            | "content-length"
            | "accept"
            | "user-agent"
            | "x-request-id"
            | "x-forwarded-for"
            | "authorization"
    )
}

/// Redact sensitive values in a JSON string
pub fn redact_json_sensitive_fields(json: &str) -> String {
    let sensitive_fields = [
        "password",
        "current_password",
        "new_password",
        "secret",
        "token",
        "access_token",
        "refresh_token",
        "authorization",
    ];

    let mut result = json.to_string();

    for field in &sensitive_fields {
        // Redact string values: "field": "value" -> "field": "[REDACTED]"
        let pattern = format!(r#""{}"\s*:\s*"[^"]*""#, field);

        if let Ok(re) = regex::Regex::new(&pattern) {
            result = re
                .replace_all(&result, format!(r#""{}": "[REDACTED]""#, field).as_str())
                .to_string();
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_sensitive_header() {
        assert!(is_sensitive_header("authorization"));
        assert!(is_sensitive_header("cookie"));
        assert!(!is_sensitive_header("content-type"));
        assert!(!is_sensitive_header("accept"));
    }

    #[test]
    fn test_should_log_header() {
        assert!(should_log_header("content-type"));
        assert!(should_log_header("authorization"));
        assert!(should_log_header("user-agent"));
        assert!(!should_log_header("cache-control"));
    }

    #[test]
    fn test_redact_json_password() {
        let input = r#"{"username": "alice", "password": "secret123"}"#;
        let result = redact_json_sensitive_fields(input);
        assert!(result.contains("[REDACTED]"));
        assert!(!result.contains("secret123"));
        assert!(result.contains("alice"));
    }

    #[test]
    fn test_redact_json_tokens() {
        let input = r#"{"access_token": "eyJ...", "refresh_token": "eyK..."}"#;
        let result = redact_json_sensitive_fields(input);
        assert!(!result.contains("eyJ..."));
        assert!(!result.contains("eyK..."));
    }

    #[test]
    fn test_redact_headers() {
        let request = Request::builder()
            .header("authorization", "Bearer secret-token")
            .header("content-type", "application/json")
            .body(Body::empty())
            .unwrap();

        let log = redact_headers(&request);
        assert!(log.contains("authorization=[REDACTED]"));
        assert!(log.contains("content-type=application/json"));
        assert!(!log.contains("secret-token"));
    }
}
