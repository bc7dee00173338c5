use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{config::AppConfig, error::AppError};

/// Rejects requests whose URI tries to climb out of a directory and POST/PUT
/// requests whose declared body exceeds `limits.max_body_bytes`.
///
/// Traversal in the URI is answered with 403, the same as a handler-level
/// containment failure, so skill file reads fail identically however the
/// `..` segments arrive.
pub async fn validate_request_middleware(State(cfg): State<Arc<AppConfig>>, req: Request, next: Next) -> Response {
    let uri_path = req.uri().path();
    if contains_path_traversal(uri_path) {
        return AppError::AccessDenied(format!("path traversal in {}", sanitize_for_logging(uri_path)))
            .into_response();
    }

    if let Some(user_agent) = req.headers().get("user-agent").and_then(|ua| ua.to_str().ok()) {
        if is_suspicious_user_agent(user_agent) {
            tracing::warn!("Suspicious user agent detected: {}", sanitize_for_logging(user_agent));
        }
    }

    // Early rejection ahead of DefaultBodyLimit, which only trips while reading.
    if matches!(*req.method(), Method::POST | Method::PUT) {
        let declared = req
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if let Some(length) = declared {
            let max_body_size = cfg.limits.max_body_bytes;
            if length > max_body_size {
                return (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    Json(json!({
                        "success": false,
                        "error": format!("Request body exceeds maximum size of {} bytes", max_body_size),
                        "code": "PAYLOAD_TOO_LARGE",
                        "status": 413,
                        "timestamp": chrono::Utc::now().to_rfc3339(),
                    })),
                )
                    .into_response();
            }
        }
    }

    next.run(req).await
}

/// Detects `.`/`..` segments, literal or percent-encoded (once or twice), and
/// NUL bytes. Names that merely start with dots, like `..notes`, pass.
pub(crate) fn contains_path_traversal(path: &str) -> bool {
    if path.contains('\0') {
        return true;
    }

    let lower = path.to_lowercase().replace("%25", "%");
    if lower.contains("%00") {
        return true;
    }

    let normalized = lower.replace("%2e", ".").replace("%2f", "/").replace("%5c", "/").replace('\\', "/");
    normalized.split('/').any(|segment| segment == ".." || segment == ".")
}

fn is_suspicious_user_agent(ua: &str) -> bool {
    let ua_lower = ua.to_lowercase();
    ua_lower.contains("scanner")
        || (ua_lower.contains("crawler") && !ua_lower.contains("googlebot") && !ua_lower.contains("bingbot"))
        || ua_lower.contains("nikto")
        || ua_lower.contains("sqlmap")
}

/// Strips control characters (except whitespace), escapes quotes and caps the
/// length at 200 characters before user input reaches a log line.
pub fn sanitize_for_logging(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .take(200)
        .collect::<String>()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\'', "\\\'")
}
