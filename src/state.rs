use std::sync::Arc;

use crate::config::AppConfig;
use crate::layout::ConfigLayout;
use crate::metrics::Metrics;
use crate::middleware::{rate_limit::WRITE_ENDPOINTS, EndpointRateLimiter, RateLimiter};
use crate::process::{ProcessProbe, SystemProcessProbe};
use crate::scanner::SkillScanner;

/// The shared application state.
///
/// Cloned into every handler. Nothing in here caches skills or agents: each
/// request reads the configuration directory afresh.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Well-known paths under the configuration directory.
    pub layout: Arc<ConfigLayout>,
    pub scanner: SkillScanner,
    pub metrics: Metrics,
    /// Budget for writes, keyed by route prefix.
    pub rate_limiter: EndpointRateLimiter,
    /// Budget for every request, keyed by client IP.
    pub global_limiter: RateLimiter,
    /// Liveness check for the PIDs recorded in IDE lock files.
    pub probe: Arc<dyn ProcessProbe>,
}

impl AppState {
    /// Builds the state for the configured directory, probing PIDs through `sysinfo`.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let root = config.config_root()?;
        Self::with_root(config, root, Arc::new(SystemProcessProbe))
    }

    /// Builds the state for an explicit configuration directory and process probe.
    pub fn with_root(
        config: AppConfig,
        root: impl Into<std::path::PathBuf>,
        probe: Arc<dyn ProcessProbe>,
    ) -> anyhow::Result<Self> {
        let root = root.into();
        let scanner = SkillScanner::new(root.clone(), &config.scan)?;

        let write_limit = config.limits.write_limit_per_minute;
        let rate_limiter = EndpointRateLimiter::new()
            .with_limits(WRITE_ENDPOINTS.iter().map(|endpoint| (*endpoint, write_limit, 60)).collect());
        let global_limiter =
            RateLimiter::new(config.limits.rate_limit_max_requests, config.limits.rate_limit_window_seconds);

        Ok(Self {
            config: Arc::new(config),
            layout: Arc::new(ConfigLayout::new(root)),
            scanner,
            metrics: Metrics::new(),
            rate_limiter,
            global_limiter,
            probe,
        })
    }
}
