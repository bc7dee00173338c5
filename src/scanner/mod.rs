//! Skill discovery: a depth-first walk for `SKILL.md` marker files.
//!
//! A missing root, an unreadable sub-directory or a malformed marker file each
//! contribute zero skills; the walk itself never fails.

pub mod entries;
pub mod tree;

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio::task;
use walkdir::WalkDir;

use crate::{
    config::ScanConfig,
    error::AppResult,
    frontmatter,
    layout::{ConfigLayout, SKILL_MARKER},
    types::DiscoveredSkill,
};

pub use tree::build_skill_tree;

/// What a single marker file contributed to a scan.
#[derive(Debug)]
enum EntryOutcome {
    Found(DiscoveredSkill),
    /// Marker could not be read or parsed; already logged.
    Failed,
}

#[derive(Debug, Default, Clone)]
pub struct ScanReport {
    pub skills: Vec<DiscoveredSkill>,
    pub markers_seen: u64,
    pub parse_failures: u64,
    pub walk_errors: u64,
}

impl ScanReport {
    fn merge(&mut self, other: ScanReport) {
        self.skills.extend(other.skills);
        self.markers_seen += other.markers_seen;
        self.parse_failures += other.parse_failures;
        self.walk_errors += other.walk_errors;
    }
}

#[derive(Debug, Clone)]
pub struct SkillScanner {
    config_root: PathBuf,
    excludes: GlobSet,
    max_depth: Option<usize>,
}

impl SkillScanner {
    pub fn new(config_root: impl Into<PathBuf>, options: &ScanConfig) -> anyhow::Result<Self> {
        Ok(Self {
            config_root: config_root.into(),
            excludes: build_globset(&options.excludes)?,
            max_depth: options.max_depth,
        })
    }

    pub fn config_root(&self) -> &Path {
        &self.config_root
    }

    /// Walks `dir` and returns every parseable skill below it.
    ///
    /// `base` anchors `path`/`pathParts`; `id` is always relative to the config root.
    pub fn find_skill_files(&self, dir: &Path, base: &Path) -> ScanReport {
        let mut report = ScanReport::default();
        if !dir.is_dir() {
            tracing::debug!("Skill root {} does not exist, nothing to scan", dir.display());
            return report;
        }

        for entry in self.walker(dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    report.walk_errors += 1;
                    tracing::warn!("Skipping unreadable path during skill scan: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_dir() || entry.file_name() != SKILL_MARKER {
                continue;
            }

            report.markers_seen += 1;
            match self.inspect_marker(entry.path(), base) {
                EntryOutcome::Found(skill) => report.skills.push(skill),
                EntryOutcome::Failed => report.parse_failures += 1,
            }
        }

        report
    }

    /// Counts marker files below `dir` without parsing them.
    pub fn count_skill_files(&self, dir: &Path) -> usize {
        if !dir.is_dir() {
            return 0;
        }
        self.walker(dir)
            .filter_map(Result::ok)
            .filter(|e| !e.file_type().is_dir() && e.file_name() == SKILL_MARKER)
            .count()
    }

    /// Scans the local skills dir and the marketplace tree concurrently.
    ///
    /// Local skills are anchored at `skills/`, marketplace skills at the config
    /// root so their third path segment names the repository.
    pub async fn scan_all(&self, layout: &ConfigLayout) -> AppResult<ScanReport> {
        let local_dir = layout.skills_dir();
        let market_dir = layout.marketplaces_dir();
        let root = layout.root().to_path_buf();

        let local_scanner = self.clone();
        let market_scanner = self.clone();
        let (local, market) = tokio::join!(
            task::spawn_blocking(move || local_scanner.find_skill_files(&local_dir, &local_dir)),
            task::spawn_blocking(move || market_scanner.find_skill_files(&market_dir, &root)),
        );

        let mut report = local?;
        report.merge(market?);
        Ok(report)
    }

    pub async fn count_all(&self, layout: &ConfigLayout) -> AppResult<usize> {
        let scanner = self.clone();
        let dirs = [layout.skills_dir(), layout.marketplaces_dir()];
        let count = task::spawn_blocking(move || dirs.iter().map(|d| scanner.count_skill_files(d)).sum::<usize>())
            .await?;
        Ok(count)
    }

    fn walker(&self, dir: &Path) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> + '_ {
        // Symlinked directories are not descended into, so link cycles cannot loop the walk.
        let mut walk = WalkDir::new(dir).follow_links(false).sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walk = walk.max_depth(depth);
        }
        walk.into_iter().filter_entry(move |e| e.depth() == 0 || !matches_excludes(e.path(), &self.excludes))
    }

    fn inspect_marker(&self, marker: &Path, base: &Path) -> EntryOutcome {
        let content = match fs::read_to_string(marker) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Error reading skill file {}: {}", marker.display(), e);
                return EntryOutcome::Failed;
            }
        };
        let doc = match frontmatter::parse(&content) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("Error parsing skill file {}: {}", marker.display(), e);
                return EntryOutcome::Failed;
            }
        };

        let skill_dir = marker.parent().unwrap_or(base);
        let path_parts = relative_parts(skill_dir, base);
        let id = if skill_dir.starts_with(&self.config_root) {
            relative_parts(skill_dir, &self.config_root).join("/")
        } else {
            path_parts.join("/")
        };
        let (created_at, updated_at) = match fs::metadata(marker) {
            Ok(md) => entries::file_times(&md),
            Err(_) => (None, None),
        };

        EntryOutcome::Found(DiscoveredSkill {
            name: doc
                .text_field("name")
                .or_else(|| path_parts.last().cloned())
                .unwrap_or_else(|| "Unnamed Skill".to_string()),
            description: doc.text_field("description").unwrap_or_default(),
            path: path_parts.join("/"),
            full_path: marker.to_string_lossy().into_owned(),
            category: doc.text_field("category").unwrap_or_else(|| "general".to_string()),
            tags: doc.list_field("tags"),
            author: doc.text_field("author").unwrap_or_default(),
            version: doc.text_field("version").unwrap_or_default(),
            created_at,
            updated_at,
            id,
            path_parts,
        })
    }
}

/// Components of `path` below `base`; empty when they are the same directory.
pub fn relative_parts(path: &Path, base: &Path) -> Vec<String> {
    path.strip_prefix(base)
        .map(|rel| {
            rel.components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut b = GlobSetBuilder::new();
    for p in patterns {
        if p.trim().is_empty() {
            continue;
        }
        // Patterns are matched against `/`-normalized paths, see `matches_excludes`.
        let norm = p.trim().replace('\\', "/");
        b.add(Glob::new(&norm)?);
    }
    Ok(b.build()?)
}

fn matches_excludes(path: &Path, set: &GlobSet) -> bool {
    if set.is_empty() {
        return false;
    }
    let s = path.to_string_lossy().replace('\\', "/");
    set.is_match(&s)
}
