use std::path::Path as FsPath;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::{json, Value};
use tokio::fs;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

/// `stats-cache.json` merged with live project, agent and skill counts.
pub async fn get_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let layout = &state.layout;
    let raw = match fs::read_to_string(layout.stats_file()).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound("stats-cache.json not found".into()));
        }
        Err(e) => return Err(e.into()),
    };
    let mut data = match serde_json::from_str::<Value>(&raw)? {
        Value::Object(map) => map,
        _ => return Err(AppError::Parse("stats-cache.json must contain a JSON object".into())),
    };

    let projects_dir = layout.projects_dir();
    let agents_dir = layout.agents_dir();
    let (total_projects, total_agents, total_skills) = tokio::join!(
        count_projects(&projects_dir),
        count_agents(&agents_dir),
        state.scanner.count_all(layout),
    );

    data.insert("totalProjects".into(), json!(total_projects));
    data.insert("totalAgents".into(), json!(total_agents));
    data.insert("totalSkills".into(), json!(total_skills?));

    Ok(Json(json!({ "success": true, "data": data })))
}

/// Non-hidden directories directly under `projects/`; a missing dir counts zero.
async fn count_projects(dir: &FsPath) -> usize {
    let Ok(mut entries) = fs::read_dir(dir).await else {
        return 0;
    };
    let mut count = 0;
    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if fs::metadata(entry.path()).await.map(|m| m.is_dir()).unwrap_or(false) {
            count += 1;
        }
    }
    count
}

async fn count_agents(dir: &FsPath) -> usize {
    let Ok(mut entries) = fs::read_dir(dir).await else {
        return 0;
    };
    let mut count = 0;
    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry.file_name().to_string_lossy().ends_with(".md") {
            count += 1;
        }
    }
    count
}
