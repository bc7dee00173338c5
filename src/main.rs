use std::net::SocketAddr;

use tokio::time::{self, Duration as TokioDuration};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agentdeck::{config, routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging: stdout plus a daily rotated file under ./logs
    std::fs::create_dir_all("logs").ok();
    let (stdout_nb, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let file_appender = tracing_appender::rolling::daily("logs", "agentdeck.log");
    let (file_nb, file_guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(stdout_nb))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file_nb))
        .init();
    // Non-blocking writers flush only while their guards are alive
    let _log_guards = (stdout_guard, file_guard);

    // Configuration: embedded defaults -> agentdeck.toml -> AGENTDECK_CONFIG -> env/.env
    let app_cfg = config::load()?;
    let state = AppState::new(app_cfg.clone())?;
    info!("Serving configuration directory {}", state.layout.root().display());
    if !state.layout.root().is_dir() {
        tracing::warn!("{} does not exist yet; it is created on the first write", state.layout.root().display());
    }

    // Periodic cleanup for the rate limiter maps to avoid memory growth
    {
        let endpoint_limits = state.rate_limiter.clone();
        let global_limits = state.global_limiter.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(TokioDuration::from_secs(300));
            loop {
                ticker.tick().await;
                endpoint_limits.cleanup_all().await;
                global_limits.cleanup_old_entries().await;
            }
        });
    }

    let ui_dir = app_cfg.ui_dir().filter(|dir| {
        let usable = dir.join("index.html").is_file();
        if !usable {
            tracing::warn!("server.ui_dir {} has no index.html, static UI disabled", dir.display());
        }
        usable
    });
    let app = routes::app(state, ui_dir.as_deref());

    let port: u16 = app_cfg.server.port;
    let host: String = app_cfg.server.host.clone();
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen addr {}:{} - {}", host, port, e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("AgentDeck listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("Shutdown signal received. Stopping server...");
}
