use std::path::{Path, PathBuf};

/// File name marking a directory as one skill.
pub const SKILL_MARKER: &str = "SKILL.md";

/// Config-root-relative prefix of skills installed from plugin marketplaces.
pub const MARKETPLACE_PREFIX: &str = "plugins/marketplaces/";

/// Well-known locations inside the base configuration directory.
///
/// Built once from configuration and handed to every handler through
/// `AppState`, so nothing reads the home directory on its own.
#[derive(Debug, Clone)]
pub struct ConfigLayout {
    root: PathBuf,
}

impl ConfigLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locally authored skills: `<root>/skills`.
    pub fn skills_dir(&self) -> PathBuf {
        self.root.join("skills")
    }

    /// Skills shipped by plugin marketplaces: `<root>/plugins/marketplaces`.
    pub fn marketplaces_dir(&self) -> PathBuf {
        self.root.join("plugins").join("marketplaces")
    }

    pub fn agents_dir(&self) -> PathBuf {
        self.root.join("agents")
    }

    pub fn ide_dir(&self) -> PathBuf {
        self.root.join("ide")
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.root.join("projects")
    }

    pub fn stats_file(&self) -> PathBuf {
        self.root.join("stats-cache.json")
    }

    pub fn sdk_config_file(&self) -> PathBuf {
        self.root.join("sdk-config.json")
    }

    pub fn agent_file(&self, id: &str) -> PathBuf {
        self.agents_dir().join(format!("{}.md", id))
    }
}
