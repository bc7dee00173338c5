use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub ui_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub config_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    pub excludes: Vec<String>,
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub max_body_bytes: usize,
    pub rate_limit_max_requests: usize,
    pub rate_limit_window_seconds: u64,
    pub write_limit_per_minute: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    pub enable_hsts: Option<bool>,
    pub hsts_max_age: Option<u64>,
    pub hsts_include_subdomains: Option<bool>,
    pub csp: Option<String>,
    /// Bearer token required on every request when set.
    pub auth_token: Option<String>,
    /// Value expected in `X-CSRF-Token` on state-changing requests when set.
    pub csrf_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub paths: PathsConfig,
    pub scan: ScanConfig,
    pub limits: LimitsConfig,
    pub security: Option<SecurityConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        // Fallback: parse the embedded default TOML
        let defaults: &str = include_str!("../config/default.toml");
        match ::config::Config::builder()
            .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
            .build()
        {
            Ok(cfg) => match cfg.try_deserialize() {
                Ok(app_cfg) => app_cfg,
                Err(e) => {
                    eprintln!("FATAL: Failed to deserialize default config: {}", e);
                    panic!("Failed to deserialize default config: {}", e);
                }
            },
            Err(e) => {
                eprintln!("FATAL: Failed to parse default config: {}", e);
                panic!("Failed to parse default config: {}", e);
            }
        }
    }
}

impl AppConfig {
    /// The base configuration directory all skill/agent paths hang off.
    ///
    /// An empty or missing `paths.config_dir` falls back to `<home>/.claude`.
    pub fn config_root(&self) -> anyhow::Result<PathBuf> {
        match self.paths.config_dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
            _ => {
                let base = directories::BaseDirs::new()
                    .ok_or_else(|| anyhow::anyhow!("could not determine home directory"))?;
                Ok(base.home_dir().join(".claude"))
            }
        }
    }

    pub fn ui_dir(&self) -> Option<PathBuf> {
        self.server
            .ui_dir
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
    }
}

pub fn load() -> anyhow::Result<AppConfig> {
    // Load .env first (optional)
    let _ = dotenvy::dotenv();

    let defaults: &str = include_str!("../config/default.toml");
    let mut builder = ::config::Config::builder()
        .add_source(::config::File::from_str(defaults, ::config::FileFormat::Toml))
        // Optional local file: agentdeck.toml (in CWD)
        .add_source(::config::File::with_name("agentdeck").required(false));

    if let Ok(custom_path) = std::env::var("AGENTDECK_CONFIG") {
        builder = builder.add_source(::config::File::with_name(&custom_path).required(false));
    }
    // Environment variables last to have highest precedence
    builder = builder.add_source(
        ::config::Environment::with_prefix("AGENTDECK")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("scan.excludes")
            .try_parsing(true),
    );

    let cfg = builder.build()?;
    let app_cfg: AppConfig = cfg.try_deserialize()?;
    validate(&app_cfg)?;
    Ok(app_cfg)
}

pub(crate) fn validate(cfg: &AppConfig) -> anyhow::Result<()> {
    // Server
    if cfg.server.port == 0 {
        return Err(anyhow::anyhow!("invalid server.port: {}", cfg.server.port));
    }
    #[cfg(unix)]
    if cfg.server.port < 1024 {
        tracing::warn!("Using privileged port {} - may require elevated permissions", cfg.server.port);
    }

    // Scan
    if let Some(depth) = cfg.scan.max_depth {
        if depth == 0 {
            return Err(anyhow::anyhow!("scan.max_depth must be > 0 when set"));
        }
    }
    for pattern in &cfg.scan.excludes {
        globset::Glob::new(pattern.trim())
            .map_err(|e| anyhow::anyhow!("invalid scan.excludes pattern '{}': {}", pattern, e))?;
    }

    // Limits
    if cfg.limits.max_body_bytes < 1024 || cfg.limits.max_body_bytes > 50 * 1024 * 1024 {
        return Err(anyhow::anyhow!("limits.max_body_bytes must be in 1024..=52428800"));
    }
    if cfg.limits.rate_limit_max_requests == 0 {
        return Err(anyhow::anyhow!("limits.rate_limit_max_requests must be > 0"));
    }
    if cfg.limits.rate_limit_window_seconds == 0 {
        return Err(anyhow::anyhow!("limits.rate_limit_window_seconds must be > 0"));
    }
    if cfg.limits.write_limit_per_minute == 0 {
        return Err(anyhow::anyhow!("limits.write_limit_per_minute must be > 0"));
    }

    Ok(())
}
