use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::frontmatter::Metadata;

/// One directory carrying a `SKILL.md` marker, as found by the scanner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredSkill {
    /// Config-root-relative directory of the marker, always `/`-separated.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Scan-base-relative directory, `/`-separated.
    pub path: String,
    pub path_parts: Vec<String>,
    pub full_path: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub version: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Discovered skills split into local ones and marketplace ones grouped by repository.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SkillTree {
    pub skills: Vec<DiscoveredSkill>,
    pub plugins: BTreeMap<String, Vec<DiscoveredSkill>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillListResponse {
    pub success: bool,
    pub skills: Vec<DiscoveredSkill>,
    pub tree: SkillTree,
    pub total: usize,
}

/// Immediate child of a directory, as shown by the dashboard's file tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDetail {
    pub id: String,
    pub metadata: Metadata,
    pub content: String,
    pub raw_content: String,
    pub full_path: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub resource_files: Vec<FileEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    pub name: String,
    pub content: String,
    pub size: u64,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Body of create/update requests for local skills.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveSkillRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub author: Option<String>,
    pub version: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub id: String,
    pub filename: String,
    pub name: String,
    pub description: String,
    pub tools: Vec<String>,
    pub model: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDetail {
    pub id: String,
    pub filename: String,
    pub metadata: Metadata,
    pub content: String,
    pub raw_content: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of create/update requests for agents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveAgentRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tools: Option<Vec<String>>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub content: Option<String>,
}

/// Contents of an `ide/*.lock` file written by an IDE extension.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeLockFile {
    /// Usually a number; anything else leaves the connection inactive.
    pub pid: Option<serde_json::Value>,
    pub ide_name: Option<String>,
    #[serde(default)]
    pub workspace_folders: Vec<String>,
    pub transport: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeConnection {
    pub id: String,
    pub name: String,
    pub status: ConnectionStatus,
    pub pid: Option<serde_json::Value>,
    pub lock_file: String,
    pub workspace_folders: Vec<String>,
    pub transport: String,
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CleanupRequest {
    /// A number or a numeric string.
    pub pid: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedConnection {
    pub original_file: String,
    pub removed_file: String,
    pub pid: u32,
    pub ide_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkConfigBody {
    pub cli_executable_path: Option<String>,
}
