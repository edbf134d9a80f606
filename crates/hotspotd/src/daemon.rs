//! Daemon wiring.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use hotspot_api::ApiState;
use hotspot_autoscale::{ElasticScaler, ScaleCallback};
use hotspot_core::{HotspotConfig, RunMode};
use hotspot_forecast::HttpForecastSource;
use hotspot_placement::{MemoryCluster, PlacementTaskQueue};
use hotspot_scheduler::{PredictionFetchLoop, ScheduleHost};

pub async fn run(config: HotspotConfig, topology: Option<PathBuf>) -> anyhow::Result<()> {
    info!(mode = ?config.mode, forecast = %config.forecast.url, "hotspot daemon starting");

    // ── Cluster view ───────────────────────────────────────────

    let cluster = match &topology {
        Some(path) => {
            let cluster = MemoryCluster::from_file(path)?;
            info!(path = ?path, "cluster topology loaded");
            cluster
        }
        None => {
            warn!("no topology given, scheduling against an empty cluster");
            MemoryCluster::default()
        }
    };
    cluster.set_region_schedule_limit(config.scheduler.region_schedule_limit);
    let cluster = Arc::new(cluster);

    // ── Forecast → queue ───────────────────────────────────────

    let source = Arc::new(HttpForecastSource::new(
        &config.forecast.url,
        config.forecast.timeout(),
    )?);
    let queue = Arc::new(PlacementTaskQueue::new());

    let scaler = ElasticScaler::new(&config.autoscale).with_scale_fn(log_only_scale_fn());
    let fetch_loop = PredictionFetchLoop::new(source, cluster.clone(), queue.clone(), &config)
        .with_scaler(scaler);
    let last_plan = fetch_loop.last_plan();

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Start background tasks ─────────────────────────────────

    let fetch_handle = tokio::spawn(fetch_loop.run(shutdown_rx.clone()));

    let host_handle = match config.mode {
        RunMode::Placement => {
            let host = ScheduleHost::new(cluster.clone(), queue.clone());
            let interval = config.scheduler.tick_interval();
            let host_shutdown = shutdown_rx.clone();
            Some(tokio::spawn(async move {
                host.run(interval, host_shutdown).await;
            }))
        }
        RunMode::Autoscale => None,
    };

    // ── Start API server ───────────────────────────────────────

    let router = hotspot_api::build_router(ApiState { queue, last_plan });
    let addr = config.api.listen_addr;
    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    // Wait for background tasks.
    let _ = fetch_handle.await;
    if let Some(handle) = host_handle {
        let _ = handle.await;
    }

    info!("hotspot daemon stopped");
    Ok(())
}

/// Scale callback used when no managed cluster API is wired in: the
/// request is only logged.
fn log_only_scale_fn() -> ScaleCallback {
    Box::new(|replicas| {
        Box::pin(async move {
            info!(replicas, "scale request (no cluster API configured)");
            Ok(())
        })
    })
}
