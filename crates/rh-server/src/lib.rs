//! rh-server: HTTP API for uploading and streaming videos.
//!
//! - Multipart upload of movies, tv shows and episodes ([`ingest`])
//! - Range-aware video delivery ([`routes::stream`])
//! - Aggregate lookup, health check and OpenAPI docs
//! - Graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod ingest;
pub mod middleware;
pub mod router;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use rh_av::{DurationProbe, FfprobeDurationProbe, UnavailableProbe};
use rh_core::config::Config;

use crate::context::AppContext;

/// Pick the duration probe for this configuration.
pub fn discover_probe(config: &Config) -> Arc<dyn DurationProbe> {
    match FfprobeDurationProbe::discover(&config.tools) {
        Some(probe) => {
            tracing::info!("Tool found: ffprobe ({})", probe.path().display());
            Arc::new(probe)
        }
        None => {
            tracing::warn!("ffprobe not found; uploaded videos will have unknown duration");
            Arc::new(UnavailableProbe)
        }
    }
}

/// Start the reelhouse server.
///
/// Opens the database, builds the [`AppContext`] and serves HTTP until a
/// shutdown signal arrives.
pub async fn start(config: Config) -> rh_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let db_path = &config.server.db_path;
    let existed = db_path.exists();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created database directory {}", parent.display());
        }
    }
    let db_str = db_path.to_string_lossy();
    let db = rh_db::pool::init_pool(&db_str)?;
    if existed {
        tracing::info!("Database opened (existing) at {db_str}");
    } else {
        tracing::info!("Database created (new) at {db_str}");
    }

    tokio::fs::create_dir_all(config.storage.staging_dir()).await?;
    tracing::info!("Storing uploads under {}", config.storage.root.join("upload").display());

    let probe = discover_probe(&config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| rh_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let ctx = AppContext::new(db, config, probe);
    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| rh_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM).
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ffprobe_falls_back() {
        let mut config = Config::default();
        config.tools.ffprobe_path = Some("/nonexistent/ffprobe".into());
        let probe = discover_probe(&config);
        assert!(matches!(probe.name(), "ffprobe" | "unavailable"));
    }
}
