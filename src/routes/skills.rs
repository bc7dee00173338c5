use std::path::PathBuf;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tokio::{fs, task};

use crate::{
    error::{validation::require_text, AppError, AppResult},
    frontmatter::{self, Metadata},
    layout::SKILL_MARKER,
    routes::paths_helpers::{normalize_id, resolve_within, slugify},
    scanner::{
        build_skill_tree,
        entries::{file_times, list_dir_sorted, to_utc},
    },
    state::AppState,
    types::{FileContent, SaveSkillRequest, SkillDetail, SkillListResponse},
};

/// Separates a skill id from a resource path in `/{*id}` captures.
const FILES_SEGMENT: &str = "/files/";

pub async fn list_skills(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let layout = &state.layout;
    fs::create_dir_all(layout.skills_dir()).await?;
    fs::create_dir_all(layout.marketplaces_dir()).await?;

    let report = state.scanner.scan_all(layout).await?;
    state.metrics.record_scan(report.skills.len() as u64, report.parse_failures);
    tracing::info!(
        "Found {} skills ({} markers, {} unparsable, {} unreadable paths)",
        report.skills.len(),
        report.markers_seen,
        report.parse_failures,
        report.walk_errors
    );

    let tree = build_skill_tree(&report.skills);
    Ok(Json(SkillListResponse { success: true, total: report.skills.len(), skills: report.skills, tree }))
}

/// `GET /api/skills-manager/{*id}`: a skill's detail, or one of its resource
/// files when the capture reads `<id>/files/<name>`.
///
/// A capture naming a skill directory is always a detail request, even when one
/// of its segments is `files`. Otherwise the last `/files/` whose prefix is a
/// skill splits id from file name.
pub async fn get_skill_or_file(State(state): State<AppState>, Path(raw): Path<String>) -> AppResult<Response> {
    let id = normalize_id(&raw);
    let mut split = None;
    if !has_marker(&state, &id).await? {
        // Overlapping occurrences count too, as in `files/files/guide.md`.
        let positions: Vec<usize> = raw
            .match_indices('/')
            .map(|(pos, _)| pos)
            .filter(|&pos| raw[pos..].starts_with(FILES_SEGMENT))
            .collect();
        for &pos in positions.iter().rev() {
            let candidate = (&raw[..pos], &raw[pos + FILES_SEGMENT.len()..]);
            split = Some(candidate);
            if has_marker(&state, &normalize_id(candidate.0)).await? {
                break;
            }
        }
    }

    match split {
        Some((skill_id, name)) => get_skill_file(&state, skill_id, name).await,
        None => {
            let detail = load_skill(&state, &id).await?;
            Ok(Json(json!({ "success": true, "skill": detail })).into_response())
        }
    }
}

async fn get_skill_file(state: &AppState, id: &str, name: &str) -> AppResult<Response> {
    let id = normalize_id(id);
    let skill_dir = skill_dir(state, &id)?;
    let target = resolve_within(&skill_dir, name)?;

    let md = match fs::metadata(&target).await {
        Ok(md) => md,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("File '{}' not found in skill '{}'", name, id)));
        }
        Err(e) => return Err(e.into()),
    };

    if md.is_dir() {
        let items = task::spawn_blocking(move || list_dir_sorted(&target, |_| false, None)).await??;
        return Ok(Json(json!({ "success": true, "isDirectory": true, "items": items })).into_response());
    }

    let bytes = fs::read(&target).await?;
    let file = FileContent {
        name: name.to_string(),
        content: String::from_utf8_lossy(&bytes).into_owned(),
        size: md.len(),
        modified_at: to_utc(md.modified()),
    };
    Ok(Json(json!({ "success": true, "isDirectory": false, "file": file })).into_response())
}

pub async fn create_skill(
    State(state): State<AppState>,
    Json(req): Json<SaveSkillRequest>,
) -> AppResult<impl IntoResponse> {
    let name = require_text(req.name.as_deref(), "name", "Skill name is required")?;
    let slug = slugify(&name);
    if slug.is_empty() {
        return Err(AppError::ValidationError {
            field: "name".into(),
            message: "Skill name must contain at least one letter or digit".into(),
        });
    }

    let dir = state.layout.skills_dir().join(&slug);
    let marker = dir.join(SKILL_MARKER);
    if fs::try_exists(&marker).await? {
        return Err(AppError::Conflict(format!("Skill '{}' already exists", slug)));
    }
    fs::create_dir_all(&dir).await?;

    let mut metadata = Metadata::new();
    metadata.insert("name".into(), Value::String(name));
    metadata.insert("description".into(), Value::String(req.description.clone().unwrap_or_default()));
    metadata.insert(
        "category".into(),
        Value::String(req.category.clone().filter(|c| !c.trim().is_empty()).unwrap_or_else(|| "general".into())),
    );
    metadata.insert("tags".into(), Value::from(req.tags.clone().unwrap_or_default()));
    apply_optional(&mut metadata, "author", req.author.as_deref());
    apply_optional(&mut metadata, "version", req.version.as_deref());

    let rendered = frontmatter::serialize(&metadata, req.content.as_deref().unwrap_or_default())?;
    fs::write(&marker, rendered).await?;
    state.metrics.inc_files_written();

    let id = format!("skills/{}", slug);
    tracing::info!("Created skill {}", id);
    let detail = load_skill(&state, &id).await?;
    Ok(Json(json!({ "success": true, "skill": detail })))
}

/// Rewrites an existing marker; frontmatter keys absent from the body keep their values.
pub async fn update_skill(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    Json(req): Json<SaveSkillRequest>,
) -> AppResult<impl IntoResponse> {
    let id = normalize_id(&raw);
    let marker = existing_marker(&state, &id).await?;

    let existing = fs::read_to_string(&marker).await?;
    let doc = frontmatter::parse(&existing)?;
    let mut metadata = doc.metadata;

    apply_optional(&mut metadata, "name", req.name.as_deref());
    apply_optional(&mut metadata, "description", req.description.as_deref());
    apply_optional(&mut metadata, "category", req.category.as_deref());
    apply_optional(&mut metadata, "author", req.author.as_deref());
    apply_optional(&mut metadata, "version", req.version.as_deref());
    if let Some(tags) = req.tags {
        metadata.insert("tags".into(), Value::from(tags));
    }
    let content = req.content.unwrap_or(doc.content);

    let rendered = frontmatter::serialize(&metadata, &content)?;
    fs::write(&marker, rendered).await?;
    state.metrics.inc_files_written();
    tracing::info!("Updated skill {}", id);

    let detail = load_skill(&state, &id).await?;
    Ok(Json(json!({ "success": true, "skill": detail })))
}

/// Removes a local skill directory. Marketplace skills are managed by their
/// plugin and cannot be deleted here.
pub async fn delete_skill(State(state): State<AppState>, Path(raw): Path<String>) -> AppResult<impl IntoResponse> {
    let id = normalize_id(&raw);
    let is_local = id.strip_prefix("skills/").is_some_and(|rest| !rest.is_empty());
    if !is_local {
        return Err(AppError::BadRequest(format!("Only local skills under skills/ can be deleted, got '{}'", id)));
    }

    let dir = skill_dir(&state, &id)?;
    if !fs::metadata(&dir).await.map(|m| m.is_dir()).unwrap_or(false) {
        return Err(AppError::NotFound(format!("Skill '{}' not found", id)));
    }

    fs::remove_dir_all(&dir).await?;
    state.metrics.inc_files_deleted();
    tracing::info!("Deleted skill {}", id);
    Ok(Json(json!({ "success": true, "message": "Skill deleted successfully" })))
}

fn skill_dir(state: &AppState, id: &str) -> AppResult<PathBuf> {
    if id.is_empty() {
        return Err(AppError::BadRequest("Skill id must not be empty".into()));
    }
    resolve_within(state.layout.root(), id)
}

async fn existing_marker(state: &AppState, id: &str) -> AppResult<PathBuf> {
    let marker = skill_dir(state, id)?.join(SKILL_MARKER);
    if !fs::try_exists(&marker).await? {
        return Err(AppError::NotFound(format!("Skill '{}' not found", id)));
    }
    Ok(marker)
}

/// Whether `id` names a directory holding a marker file.
async fn has_marker(state: &AppState, id: &str) -> AppResult<bool> {
    if id.is_empty() {
        return Ok(false);
    }
    let marker = resolve_within(state.layout.root(), id)?.join(SKILL_MARKER);
    Ok(fs::metadata(&marker).await.map(|m| m.is_file()).unwrap_or(false))
}

async fn load_skill(state: &AppState, id: &str) -> AppResult<SkillDetail> {
    let marker = existing_marker(state, id).await?;
    let raw_content = fs::read_to_string(&marker).await?;
    let doc = frontmatter::parse(&raw_content)?;
    let (created_at, updated_at) = file_times(&fs::metadata(&marker).await?);
    let mut metadata = doc.metadata;
    frontmatter::normalize_lists(&mut metadata, &["tags"]);

    let dir = marker.parent().map(PathBuf::from).unwrap_or_else(|| state.layout.root().to_path_buf());
    let prefix = id.to_string();
    let resource_files =
        task::spawn_blocking(move || list_dir_sorted(&dir, |name| name == SKILL_MARKER, Some(&prefix))).await??;

    Ok(SkillDetail {
        id: id.to_string(),
        metadata,
        content: doc.content,
        raw_content,
        full_path: marker.to_string_lossy().into_owned(),
        created_at,
        updated_at,
        resource_files,
    })
}

fn apply_optional(metadata: &mut Metadata, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        metadata.insert(key.to_string(), Value::String(v.to_string()));
    }
}
