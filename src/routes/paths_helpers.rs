// Helper functions for path operations

use std::path::{Component, Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Joins a `/`-separated, client-supplied relative path onto `base` and makes
/// sure the result stays inside it.
///
/// `..` segments are applied lexically and may not climb above `base`; absolute
/// paths are refused. When the target exists, both sides are canonicalized and
/// compared again, so a symlink pointing elsewhere is refused as well.
pub fn resolve_within(base: &Path, relative: &str) -> AppResult<PathBuf> {
    if relative.contains('\0') {
        return Err(AppError::AccessDenied(format!("NUL byte in path {:?}", relative)));
    }

    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(AppError::AccessDenied(format!("{:?} escapes {}", relative, base.display())));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(AppError::AccessDenied(format!("absolute path {:?} not allowed", relative)));
            }
        }
    }

    let target = parts.iter().fold(base.to_path_buf(), |acc, p| acc.join(p));

    if let (Ok(real_base), Ok(real_target)) = (base.canonicalize(), target.canonicalize()) {
        if !real_target.starts_with(&real_base) {
            return Err(AppError::AccessDenied(format!(
                "{} resolves outside {}",
                target.display(),
                base.display()
            )));
        }
    }

    Ok(target)
}

/// Lowercases `name` and collapses every run of characters outside `[a-z0-9]`
/// into a single `-`, trimming dashes at both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Normalizes a skill id taken from the URL: separators become `/`, empty and
/// `.` segments disappear.
pub fn normalize_id(id: &str) -> String {
    id.split(['/', '\\']).filter(|s| !s.is_empty() && *s != ".").collect::<Vec<_>>().join("/")
}
