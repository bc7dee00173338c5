use std::path::{Path as FsPath, PathBuf};

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use futures::future::join_all;
use serde_json::{json, Value};
use tokio::fs;

use crate::{
    error::{
        validation::{require_text, validate_segment_id},
        AppError, AppResult,
    },
    frontmatter::{self, Document, Metadata},
    routes::paths_helpers::slugify,
    scanner::entries::file_times,
    state::AppState,
    types::{AgentDetail, AgentSummary, SaveAgentRequest},
};

const DEFAULT_MODEL: &str = "inherit";
const DEFAULT_COLOR: &str = "blue";

pub async fn list_agents(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let dir = state.layout.agents_dir();
    fs::create_dir_all(&dir).await?;

    let mut files: Vec<String> = Vec::new();
    let mut entries = fs::read_dir(&dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".md") {
            files.push(name);
        }
    }
    files.sort();

    let reads = files.into_iter().map(|filename| {
        let path = dir.join(&filename);
        async move { read_summary(&path, filename).await }
    });
    let results = join_all(reads).await;

    let total = results.len();
    let agents: Vec<AgentSummary> = results.into_iter().flatten().collect();
    let failed = total - agents.len();
    if failed > 0 {
        state.metrics.add_parse_failures(failed as u64);
    }
    tracing::debug!("Listed {} agents ({} skipped)", agents.len(), failed);

    Ok(Json(json!({ "success": true, "agents": agents })))
}

pub async fn get_agent(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<impl IntoResponse> {
    validate_segment_id(&id, "id")?;
    let path = existing_agent_file(&state, &id).await?;

    let raw_content = fs::read_to_string(&path).await?;
    let doc = frontmatter::parse(&raw_content)?;
    let (created_at, updated_at) = file_times(&fs::metadata(&path).await?);
    let mut metadata = doc.metadata;
    frontmatter::normalize_lists(&mut metadata, &["tools"]);

    let agent = AgentDetail {
        filename: format!("{}.md", id),
        id,
        metadata,
        content: doc.content,
        raw_content,
        created_at,
        updated_at,
    };
    Ok(Json(json!({ "success": true, "agent": agent })))
}

pub async fn create_agent(
    State(state): State<AppState>,
    Json(req): Json<SaveAgentRequest>,
) -> AppResult<impl IntoResponse> {
    let name = require_text(req.name.as_deref(), "name", "Agent name is required")?;
    let id = slugify(&name);
    if id.is_empty() {
        return Err(AppError::ValidationError {
            field: "name".into(),
            message: "Agent name must contain at least one letter or digit".into(),
        });
    }

    let dir = state.layout.agents_dir();
    fs::create_dir_all(&dir).await?;
    let path = state.layout.agent_file(&id);
    if fs::try_exists(&path).await? {
        return Err(AppError::Conflict(format!("Agent '{}' already exists", id)));
    }

    let summary = write_agent(&state, &path, id, name, req).await?;
    tracing::info!("Created agent {}", summary.id);
    Ok(Json(json!({ "success": true, "agent": summary })))
}

pub async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SaveAgentRequest>,
) -> AppResult<impl IntoResponse> {
    validate_segment_id(&id, "id")?;
    let path = existing_agent_file(&state, &id).await?;

    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty()).unwrap_or(id.as_str()).to_string();
    let summary = write_agent(&state, &path, id, name, req).await?;
    tracing::info!("Updated agent {}", summary.id);
    Ok(Json(json!({ "success": true, "agent": summary })))
}

pub async fn delete_agent(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<impl IntoResponse> {
    validate_segment_id(&id, "id")?;
    let path = existing_agent_file(&state, &id).await?;

    fs::remove_file(&path).await?;
    state.metrics.inc_files_deleted();
    tracing::info!("Deleted agent {}", id);
    Ok(Json(json!({ "success": true, "message": "Agent deleted successfully" })))
}

async fn existing_agent_file(state: &AppState, id: &str) -> AppResult<PathBuf> {
    let path = state.layout.agent_file(id);
    if !fs::try_exists(&path).await? {
        return Err(AppError::NotFound(format!("Agent '{}' not found", id)));
    }
    Ok(path)
}

/// Writes the agent file with defaults applied and returns the resulting summary.
async fn write_agent(
    state: &AppState,
    path: &FsPath,
    id: String,
    name: String,
    req: SaveAgentRequest,
) -> AppResult<AgentSummary> {
    let summary = AgentSummary {
        filename: format!("{}.md", id),
        id,
        name,
        description: req.description.unwrap_or_default(),
        tools: req.tools.unwrap_or_default(),
        model: non_empty_or(req.model, DEFAULT_MODEL),
        color: non_empty_or(req.color, DEFAULT_COLOR),
        created_at: None,
        updated_at: None,
    };

    let mut metadata = Metadata::new();
    metadata.insert("name".into(), Value::String(summary.name.clone()));
    metadata.insert("description".into(), Value::String(summary.description.clone()));
    metadata.insert("tools".into(), Value::from(summary.tools.clone()));
    metadata.insert("model".into(), Value::String(summary.model.clone()));
    metadata.insert("color".into(), Value::String(summary.color.clone()));

    let rendered = frontmatter::serialize(&metadata, req.content.as_deref().unwrap_or_default())?;
    fs::write(path, rendered).await?;
    state.metrics.inc_files_written();
    Ok(summary)
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

/// Reads one agent file for the list view; failures are logged and yield `None`.
async fn read_summary(path: &FsPath, filename: String) -> Option<AgentSummary> {
    let content = match fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Error reading agent file {}: {}", filename, e);
            return None;
        }
    };
    let doc = match frontmatter::parse(&content) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!("Error parsing agent file {}: {}", filename, e);
            return None;
        }
    };
    let (created_at, updated_at) = match fs::metadata(path).await {
        Ok(md) => file_times(&md),
        Err(_) => (None, None),
    };

    let id = filename.strip_suffix(".md").unwrap_or(&filename).to_string();
    Some(summary_from(&doc, id, filename, created_at, updated_at))
}

fn summary_from(
    doc: &Document,
    id: String,
    filename: String,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
) -> AgentSummary {
    AgentSummary {
        name: doc.text_field("name").unwrap_or_else(|| id.clone()),
        description: doc.text_field("description").unwrap_or_default(),
        tools: doc.list_field("tools"),
        model: doc.text_field("model").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        color: doc.text_field("color").unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        id,
        filename,
        created_at,
        updated_at,
    }
}
