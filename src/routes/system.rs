use std::path::Path as FsPath;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::{json, Value};
use tokio::fs;

use crate::{
    error::{AppError, AppResult, OptionExt},
    scanner::entries::to_utc,
    state::AppState,
    types::{CleanupRequest, ConnectionStatus, IdeConnection, IdeLockFile, RemovedConnection},
};

const LOCK_SUFFIX: &str = ".lock";
const REMOVED_SUFFIX: &str = ".removed";

/// Lists the IDE connections recorded in `ide/*.lock`, marking each active or
/// inactive by whether its PID is still running.
pub async fn ide_connections(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let dir = state.layout.ide_dir();
    if !fs::try_exists(&dir).await? {
        return Ok(Json(json!({ "success": true, "connections": [] })));
    }

    let mut connections = Vec::new();
    for lock_file in lock_files(&dir).await? {
        let path = dir.join(&lock_file);
        let lock = match read_lock(&path).await {
            Ok(lock) => lock,
            Err(e) => {
                tracing::warn!("Error parsing lock file {}: {}", lock_file, e);
                continue;
            }
        };

        let running = match lock.pid.as_ref().and_then(parse_pid) {
            Some(pid) => state.probe.is_running(pid).await,
            None => false,
        };
        let last_modified = fs::metadata(&path).await.ok().and_then(|md| to_utc(md.modified()));

        connections.push(IdeConnection {
            id: lock_file.strip_suffix(LOCK_SUFFIX).unwrap_or(&lock_file).to_string(),
            name: lock.ide_name.unwrap_or_else(|| "Unknown IDE".to_string()),
            status: if running { ConnectionStatus::Active } else { ConnectionStatus::Inactive },
            pid: lock.pid,
            workspace_folders: lock.workspace_folders,
            transport: lock.transport.unwrap_or_else(|| "unknown".to_string()),
            last_modified,
            lock_file,
        });
    }

    Ok(Json(json!({ "success": true, "connections": connections })))
}

/// Soft-deletes the lock file of one IDE connection by renaming it to `<file>.removed`.
pub async fn cleanup_connection(
    State(state): State<AppState>,
    Json(req): Json<CleanupRequest>,
) -> AppResult<impl IntoResponse> {
    let pid = req.pid.as_ref().and_then(parse_pid).ok_or_else(|| AppError::ValidationError {
        field: "pid".into(),
        message: "PID is required".into(),
    })?;

    let dir = state.layout.ide_dir();
    if !fs::try_exists(&dir).await? {
        return Err(AppError::NotFound("IDE directory not found".into()));
    }

    let mut found = None;
    for lock_file in lock_files(&dir).await? {
        match read_lock(&dir.join(&lock_file)).await {
            Ok(lock) if lock.pid.as_ref().and_then(parse_pid) == Some(pid) => {
                found = Some((lock_file, lock));
                break;
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Error processing lock file {}: {}", lock_file, e),
        }
    }
    let (lock_file, lock) = found.ok_or_not_found(&format!("IDE connection for PID {}", pid))?;

    let removed_file = format!("{}{}", lock_file, REMOVED_SUFFIX);
    fs::rename(dir.join(&lock_file), dir.join(&removed_file)).await?;
    tracing::info!("Removed IDE connection {} for pid {}", lock_file, pid);

    let removed = RemovedConnection { original_file: lock_file, removed_file, pid, ide_name: lock.ide_name };
    Ok(Json(json!({
        "success": true,
        "removed": removed,
        "message": format!("Successfully removed IDE connection for PID {}", pid),
    })))
}

/// Names of active lock files in `dir`, sorted.
async fn lock_files(dir: &FsPath) -> AppResult<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(LOCK_SUFFIX) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

async fn read_lock(path: &FsPath) -> AppResult<IdeLockFile> {
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Accepts a JSON number or a numeric string.
fn parse_pid(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|pid| *pid != 0)
}
