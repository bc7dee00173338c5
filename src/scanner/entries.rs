use std::{cmp::Ordering, fs, path::Path, time::SystemTime};

use chrono::{DateTime, Utc};

use crate::types::FileEntry;

pub fn to_utc(time: std::io::Result<SystemTime>) -> Option<DateTime<Utc>> {
    time.ok().map(DateTime::<Utc>::from)
}

/// (created, modified); creation time falls back to mtime where the platform has none.
pub fn file_times(md: &fs::Metadata) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let modified = to_utc(md.modified());
    let created = to_utc(md.created()).or(modified);
    (created, modified)
}

/// Directories first, then names case-insensitively.
pub fn compare_entries(a: &FileEntry, b: &FileEntry) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Lists the immediate children of `dir`, sorted with [`compare_entries`].
///
/// `skip` filters by file name. Entries whose metadata cannot be read are
/// dropped. With `link_prefix` set every entry carries `path = <prefix>/<name>`.
pub fn list_dir_sorted(
    dir: &Path,
    skip: impl Fn(&str) -> bool,
    link_prefix: Option<&str>,
) -> std::io::Result<Vec<FileEntry>> {
    let mut items = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        if skip(&name) {
            continue;
        }
        // Follow symlinks for size/mtime like `stat` does.
        let md = match fs::metadata(entry.path()) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!("Failed to stat {}: {}", entry.path().display(), e);
                continue;
            }
        };
        let is_directory = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        items.push(FileEntry {
            path: link_prefix.map(|p| format!("{}/{}", p, name)),
            name,
            size: md.len(),
            is_directory,
            modified_at: to_utc(md.modified()),
        });
    }
    items.sort_by(compare_entries);
    Ok(items)
}
