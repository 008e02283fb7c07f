use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::routes::{AppState, router};

/// High-level runtime that builds the app state and serves the front door.
pub struct OgserveRuntime {
    config: ServerConfig,
}

impl OgserveRuntime {
    /// Creates a runtime with the provided configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Consumes the runtime and serves until ctrl-c or SIGTERM.
    pub async fn serve(self) -> Result<()> {
        let state = AppState::from_config(&self.config)?;
        state.template.preload().await;
        serve(router(state), &self.config).await
    }
}

/// Serves an already assembled router with the provided configuration.
pub async fn serve(router: Router, config: &ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        static_dir = %config.static_dir.display(),
        template = %config.template_path.display(),
        "ogserve listening"
    );
    if config.title_nonce {
        tracing::warn!("title nonce enabled; page titles will not be stable");
    }

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ogserve stopped");
    Ok(())
}

/// Loads [`ServerConfig`] from the environment and starts serving.
pub async fn run() -> Result<()> {
    let config = ServerConfig::from_env()?;
    OgserveRuntime::new(config).serve().await
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
