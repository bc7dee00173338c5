use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

// Health check endpoint - lightweight, no filesystem access
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// Readiness probe: the configuration directory must exist and be a directory
pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let root = state.layout.root().to_path_buf();
    match tokio::fs::metadata(&root).await {
        Ok(md) if md.is_dir() => (StatusCode::OK, "ready").into_response(),
        Ok(_) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {} is not a directory", root.display()))
            .into_response(),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("not ready: {}: {}", root.display(), e)).into_response(),
    }
}

// Metrics endpoint: returns JSON snapshot
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.get_snapshot())
}

// Prometheus-compatible text exposition format
pub async fn metrics_prometheus(State(state): State<AppState>) -> impl IntoResponse {
    let m = state.metrics.get_snapshot();
    let body = format!(
        "# HELP agentdeck_skill_scans Skill list scans performed\n# TYPE agentdeck_skill_scans counter\nagentdeck_skill_scans {}\n\
# HELP agentdeck_skills_discovered Skills returned by scans\n# TYPE agentdeck_skills_discovered counter\nagentdeck_skills_discovered {}\n\
# HELP agentdeck_parse_failures Marker and agent files skipped as unparsable\n# TYPE agentdeck_parse_failures counter\nagentdeck_parse_failures {}\n\
# HELP agentdeck_files_written Skill, agent and settings files written\n# TYPE agentdeck_files_written counter\nagentdeck_files_written {}\n\
# HELP agentdeck_files_deleted Skills and agents deleted\n# TYPE agentdeck_files_deleted counter\nagentdeck_files_deleted {}\n\
# HELP agentdeck_uptime_seconds Uptime seconds\n# TYPE agentdeck_uptime_seconds gauge\nagentdeck_uptime_seconds {}\n",
        m.skill_scans,
        m.skills_discovered,
        m.parse_failures,
        m.files_written,
        m.files_deleted,
        m.uptime_seconds,
    );
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

// Version/Build info endpoint (JSON)
pub async fn version() -> impl IntoResponse {
    let body = serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "package": {
            "description": env!("CARGO_PKG_DESCRIPTION"),
            "authors": env!("CARGO_PKG_AUTHORS"),
            "license": env!("CARGO_PKG_LICENSE"),
        },
        "build": {
            "profile": if cfg!(debug_assertions) { "debug" } else { "release" },
            "os": std::env::consts::OS,
            "arch": std::env::consts::ARCH,
        }
    });
    (StatusCode::OK, Json(body))
}
