//! HTTP route handlers for the dashboard API.
//!
//! - `agents`: one-file-per-agent CRUD under `agents/`
//! - `skills`: skill discovery, detail, resource files and local skill CRUD
//! - `system`: IDE connection lock files
//! - `stats`: usage statistics plus live counts
//! - `settings`: the SDK settings file
//! - `health`: liveness, readiness, metrics and version
//! - `paths_helpers`: containment checks and slugs for client-supplied names

pub mod agents;
pub mod health;
pub mod paths_helpers;
pub mod settings;
pub mod skills;
pub mod stats;
pub mod system;

use std::path::Path;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::middleware;
use crate::state::AppState;

/// The `/api` routes, guarded by the optional bearer token and the CSRF header check.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    let cfg = state.config.clone();
    Router::new()
        .route("/api/agents-manager", get(agents::list_agents).post(agents::create_agent))
        .route(
            "/api/agents-manager/{id}",
            get(agents::get_agent).put(agents::update_agent).delete(agents::delete_agent),
        )
        .route("/api/skills-manager", get(skills::list_skills).post(skills::create_skill))
        .route(
            "/api/skills-manager/{*id}",
            get(skills::get_skill_or_file).put(skills::update_skill).delete(skills::delete_skill),
        )
        .route("/api/system/ide-connections", get(system::ide_connections))
        .route("/api/system/cleanup", post(system::cleanup_connection))
        .route("/api/stats", get(stats::get_stats))
        .route("/api/settings/sdk-config", get(settings::get_sdk_config).put(settings::put_sdk_config))
        .route_layer(from_fn_with_state(cfg.clone(), middleware::csrf::csrf_protection_middleware))
        .route_layer(from_fn_with_state(cfg, middleware::auth::auth_middleware))
}

/// The complete application: health routes, the API, an optional static UI
/// and the middleware stack.
pub fn app(state: AppState, ui_dir: Option<&Path>) -> Router {
    let cfg = state.config.clone();
    let max_body = cfg.limits.max_body_bytes;

    let mut router = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readyz))
        .route("/metrics", get(health::metrics))
        .route("/metrics/prometheus", get(health::metrics_prometheus))
        .route("/version", get(health::version))
        .merge(api_routes(&state));

    // Built dashboard with SPA fallback to index.html
    if let Some(dir) = ui_dir {
        let index = dir.join("index.html");
        router = router.fallback_service(
            ServeDir::new(dir).append_index_html_on_directories(true).not_found_service(ServeFile::new(index)),
        );
    }

    let app = router
        .with_state(state.clone())
        .layer(DefaultBodyLimit::max(max_body))
        .layer(from_fn_with_state(cfg.clone(), middleware::validation::validate_request_middleware))
        .layer(from_fn_with_state(state, middleware::rate_limit::rate_limit_middleware))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(cfg, middleware::security_headers::security_headers_middleware));

    // CORS: permissive in debug builds for a UI dev server on another port
    if cfg!(debug_assertions) {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}
