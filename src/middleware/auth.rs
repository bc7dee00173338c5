use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{config::AppConfig, error::AppError};

/// Requires `Authorization: Bearer <token>` when `security.auth_token` is configured.
///
/// Without a configured token the middleware passes every request through.
pub async fn auth_middleware(State(cfg): State<Arc<AppConfig>>, req: Request, next: Next) -> Response {
    let expected = match cfg.security.as_ref().and_then(|s| s.auth_token.as_deref()) {
        Some(t) if !t.is_empty() => t,
        _ => return next.run(req).await,
    };

    let provided = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => next.run(req).await,
        Some(_) => AppError::Unauthorized("Invalid bearer token".to_string()).into_response(),
        None => AppError::Unauthorized("Missing bearer token".to_string()).into_response(),
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
