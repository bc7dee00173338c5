//! Cross-Site Request Forgery (CSRF) protection middleware.
//!
//! The dashboard sends a static `X-CSRF-Token` header on every state-changing
//! request; the expected value comes from `security.csrf_token`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::AppConfig;

pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Rejects POST, PUT, DELETE and PATCH requests without the configured token.
///
/// An empty or missing `security.csrf_token` disables the check.
pub async fn csrf_protection_middleware(State(cfg): State<Arc<AppConfig>>, req: Request, next: Next) -> Response {
    let expected = match cfg.security.as_ref().and_then(|s| s.csrf_token.as_deref()) {
        Some(t) if !t.is_empty() => t,
        _ => return next.run(req).await,
    };

    if matches!(*req.method(), Method::POST | Method::PUT | Method::DELETE | Method::PATCH)
        && !validate_csrf_token(req.headers(), expected)
    {
        tracing::warn!("Rejected {} {} without CSRF token", req.method(), req.uri().path());
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "success": false,
                "error": format!("CSRF token required. Include the '{}' header", CSRF_HEADER),
                "code": "CSRF_TOKEN_MISSING",
                "status": 403,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        )
            .into_response();
    }

    next.run(req).await
}

fn validate_csrf_token(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false)
}
