//! Markdown files with a YAML frontmatter header.
//!
//! Both `SKILL.md` marker files and agent files look like
//!
//! ```text
//! ---
//! name: reviewer
//! tools: Read, Grep
//! ---
//!
//! free-form markdown body
//! ```
//!
//! A file without an opening `---` has no metadata and its whole content is the body.

use serde_json::{Map, Value};
use thiserror::Error;

pub type Metadata = Map<String, Value>;

#[derive(Debug, Error)]
pub enum FrontmatterError {
    #[error("frontmatter is missing its closing ---")]
    Unterminated,
    #[error("invalid frontmatter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("frontmatter must be a key/value mapping")]
    NotAMapping,
}

/// A parsed document: frontmatter metadata plus the trimmed body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub metadata: Metadata,
    pub content: String,
}

impl Document {
    /// A scalar field rendered as text; `version: 1.2` yields `"1.2"`.
    pub fn text_field(&self, key: &str) -> Option<String> {
        let text = match self.metadata.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// A list field; a scalar string is split on commas.
    pub fn list_field(&self, key: &str) -> Vec<String> {
        self.metadata.get(key).map(value_to_list).unwrap_or_default()
    }
}

pub fn parse(content: &str) -> Result<Document, FrontmatterError> {
    let (frontmatter, body) = match split(content)? {
        Some(parts) => parts,
        None => return Ok(Document { metadata: Metadata::new(), content: content.trim().to_string() }),
    };

    let metadata = if frontmatter.trim().is_empty() {
        Metadata::new()
    } else {
        match serde_yaml::from_str::<Value>(frontmatter)? {
            Value::Object(map) => map,
            Value::Null => Metadata::new(),
            _ => return Err(FrontmatterError::NotAMapping),
        }
    };

    Ok(Document { metadata, content: body.trim().to_string() })
}

/// Split at the `---` delimiter lines into (frontmatter, body).
fn split(content: &str) -> Result<Option<(&str, &str)>, FrontmatterError> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    let Some(after_open) = trimmed.strip_prefix("---") else {
        return Ok(None);
    };
    // The opening delimiter must be a line of its own.
    let Some(after_open) = after_open.strip_prefix('\n').or_else(|| after_open.strip_prefix("\r\n")) else {
        return Ok(None);
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let frontmatter = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Ok(Some((frontmatter, body)));
        }
        offset += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

/// Render metadata and body back into a frontmatter document.
///
/// Lists are written comma separated (`tools: Read, Grep`, empty ones as `[]`),
/// everything else as a YAML scalar so values containing `:` or newlines survive
/// a re-parse.
pub fn serialize(metadata: &Metadata, content: &str) -> Result<String, FrontmatterError> {
    let mut lines = Vec::with_capacity(metadata.len());
    for (key, value) in metadata {
        let rendered = match value {
            Value::Array(items) if items.is_empty() => "[]".to_string(),
            Value::Array(items) if items.iter().all(is_scalar) => {
                items.iter().map(scalar_text).collect::<Vec<_>>().join(", ")
            }
            Value::Null => String::new(),
            Value::Array(_) | Value::Object(_) => {
                // Nested structures keep their YAML block form, indented under the key.
                let block = serde_yaml::to_string(value)?;
                let indented: Vec<String> = block.trim_end().lines().map(|l| format!("  {}", l)).collect();
                lines.push(format!("{}:\n{}", key, indented.join("\n")));
                continue;
            }
            other => serde_yaml::to_string(other)?.trim_end().to_string(),
        };
        if rendered.is_empty() {
            lines.push(format!("{}:", key));
        } else {
            lines.push(format!("{}: {}", key, rendered));
        }
    }

    Ok(format!("---\n{}\n---\n\n{}", lines.join("\n"), content))
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Rewrites `keys` that are present as arrays, splitting comma separated strings
/// and turning an empty value into `[]`.
pub fn normalize_lists(metadata: &mut Metadata, keys: &[&str]) {
    for key in keys {
        if let Some(value) = metadata.get_mut(*key) {
            let list = value_to_list(value);
            *value = Value::from(list);
        }
    }
}

pub fn value_to_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => {
            items.iter().map(scalar_text).filter(|s| !s.is_empty()).collect()
        }
        Value::String(s) => {
            s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
        }
        _ => Vec::new(),
    }
}
