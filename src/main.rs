//! Waypoint - process entry point
//!
//! Loads configuration, registers routes from the configured YAML file and
//! runs the background health sweep until Ctrl-C.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use waypoint::adapters::{load_routes_file, HttpHealthChecker, SystemClock};
use waypoint::application::{Router, RouterDeps};
use waypoint::config::{AppConfig, LogFormat, ServerConfig};

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match server.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        production = config.is_production(),
        metrics_capacity = config.router.metrics_capacity,
        "Starting waypoint"
    );

    let deps = RouterDeps::in_memory(
        &config.router,
        Arc::new(HttpHealthChecker::new()?),
        Arc::new(SystemClock),
    );
    let router = Router::new(deps).with_default_stats_window(config.router.stats_window());

    if let Some(path) = &config.router.routes_file {
        let definitions = load_routes_file(path)?;
        let ids = router.load_routes(definitions)?;
        tracing::info!(count = ids.len(), file = %path.display(), "Routes loaded");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep = if config.router.health_sweep_enabled {
        let sweep = router.health_sweep(config.router.health_sweep_interval());
        Some(tokio::spawn(async move { sweep.run(shutdown_rx).await }))
    } else {
        if config.is_production() {
            tracing::warn!("Health sweep disabled in production; targets are only probed on dispatch");
        }
        None
    };

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received shutdown signal");

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweep {
        handle.await?;
    }

    let stats = router.stats();
    tracing::info!(
        total_requests = stats.total_requests,
        failed_requests = stats.failed_requests,
        p50_ms = stats.p50_ms,
        p95_ms = stats.p95_ms,
        p99_ms = stats.p99_ms,
        "Final statistics"
    );
    tracing::debug!(stats = %serde_json::to_string(&stats)?, "Final per-route statistics");
    Ok(())
}
