use axum::{extract::State, response::IntoResponse, Json};
use serde_json::{json, Map, Value};
use tokio::fs;

use crate::{error::AppResult, state::AppState, types::SdkConfigBody};

const CLI_PATH_KEY: &str = "cliExecutablePath";

pub async fn get_sdk_config(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let config = read_sdk_config(&state).await;
    let path = config.get(CLI_PATH_KEY).and_then(Value::as_str).unwrap_or_default();
    Ok(Json(json!({ "success": true, CLI_PATH_KEY: path })))
}

/// Stores `cliExecutablePath`, keeping every other key already in the file.
pub async fn put_sdk_config(
    State(state): State<AppState>,
    Json(body): Json<SdkConfigBody>,
) -> AppResult<impl IntoResponse> {
    let mut config = read_sdk_config(&state).await;
    let path = body.cli_executable_path.unwrap_or_default();
    config.insert(CLI_PATH_KEY.into(), Value::String(path.clone()));

    fs::create_dir_all(state.layout.root()).await?;
    let rendered = serde_json::to_string_pretty(&Value::Object(config))?;
    fs::write(state.layout.sdk_config_file(), rendered).await?;
    state.metrics.inc_files_written();
    tracing::info!("Saved SDK configuration");

    Ok(Json(json!({ "success": true, CLI_PATH_KEY: path })))
}

/// The settings object on disk; a missing, unreadable or non-object file reads as empty.
async fn read_sdk_config(state: &AppState) -> Map<String, Value> {
    let path = state.layout.sdk_config_file();
    let raw = match fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
        Err(e) => {
            tracing::warn!("Error reading {}: {}", path.display(), e);
            return Map::new();
        }
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            tracing::warn!("{} does not contain a JSON object, ignoring it", path.display());
            Map::new()
        }
        Err(e) => {
            tracing::warn!("Error parsing {}: {}", path.display(), e);
            Map::new()
        }
    }
}
