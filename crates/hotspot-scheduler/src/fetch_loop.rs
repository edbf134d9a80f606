//! Prediction fetch loop.
//!
//! Fetches a forecast immediately on start and then once per interval.
//! Every successful fetch runs the forecast pipeline; what happens next
//! depends on the run mode:
//!
//! - **placement**: a window dispatcher is spawned that sleeps until each
//!   window opens, ranks the hottest regions and queues a placement task.
//! - **autoscale**: the forecast's replica recommendation is handed to the
//!   [`ElasticScaler`].
//!
//! A failed cycle is logged and skipped; the loop itself only stops on
//! shutdown.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use hotspot_autoscale::{ElasticScaler, ScaleDecision};
use hotspot_core::{HotspotConfig, PlacementTask, RunMode, StoreId, epoch_secs};
use hotspot_forecast::{DispatchPlan, ForecastError, ForecastPipeline, ForecastSource};
use hotspot_placement::{ClusterView, PlacementTaskQueue, rank_hot_regions};

/// Most recent successful plan, shared with the status API.
pub type SharedPlan = Arc<RwLock<Option<DispatchPlan>>>;

/// What a single fetch cycle did.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Fetch or pipeline failed; nothing changed.
    Skipped,
    /// A dispatcher was spawned. It resolves to the number of tasks queued.
    Dispatching(JoinHandle<usize>),
    /// Autoscale mode handled the replica recommendation.
    Scaled(ScaleDecision),
}

pub struct PredictionFetchLoop {
    source: Arc<dyn ForecastSource>,
    pipeline: ForecastPipeline,
    mode: RunMode,
    interval: Duration,
    cluster: Arc<dyn ClusterView>,
    queue: Arc<PlacementTaskQueue>,
    target_stores: Vec<StoreId>,
    scaler: ElasticScaler,
    last_plan: SharedPlan,
}

impl PredictionFetchLoop {
    pub fn new(
        source: Arc<dyn ForecastSource>,
        cluster: Arc<dyn ClusterView>,
        queue: Arc<PlacementTaskQueue>,
        config: &HotspotConfig,
    ) -> Self {
        Self {
            source,
            pipeline: ForecastPipeline::new(),
            mode: config.mode,
            interval: config.forecast.fetch_interval(),
            cluster,
            queue,
            target_stores: config.placement.target_stores.clone(),
            scaler: ElasticScaler::new(&config.autoscale),
            last_plan: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the default scaler (which has no callback).
    pub fn with_scaler(mut self, scaler: ElasticScaler) -> Self {
        self.scaler = scaler;
        self
    }

    /// Handle to the most recent plan.
    pub fn last_plan(&self) -> SharedPlan {
        self.last_plan.clone()
    }

    pub fn pipeline(&self) -> &ForecastPipeline {
        &self.pipeline
    }

    /// Fetch once and act on the result.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let snapshot = match self.source.fetch().await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "forecast fetch failed, skipping cycle");
                return CycleOutcome::Skipped;
            }
        };
        let replicas = snapshot.replicas;

        let plan = match self.pipeline.run(snapshot) {
            Ok(plan) => plan,
            Err(ForecastError::NoHotSignal) => {
                info!("no table above threshold, nothing to schedule this cycle");
                return CycleOutcome::Skipped;
            }
            Err(e) => {
                warn!(error = %e, "forecast rejected, skipping cycle");
                return CycleOutcome::Skipped;
            }
        };

        *self.last_plan.write().unwrap_or_else(PoisonError::into_inner) = Some(plan.clone());

        match self.mode {
            RunMode::Placement => CycleOutcome::Dispatching(tokio::spawn(dispatch_windows(
                plan,
                self.cluster.clone(),
                self.queue.clone(),
                self.target_stores.clone(),
            ))),
            RunMode::Autoscale => CycleOutcome::Scaled(self.scaler.apply(replicas).await),
        }
    }

    /// Run until `shutdown` fires. Pending window dispatchers are aborted
    /// on the way out.
    pub async fn run(mut self, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        info!(
            mode = ?self.mode,
            interval_secs = self.interval.as_secs(),
            "prediction fetch loop started"
        );

        let mut pending = Vec::new();
        if let CycleOutcome::Dispatching(handle) = self.run_cycle().await {
            pending.push(handle);
        }

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    debug!("fetching forecast");
                    pending.retain(|h: &JoinHandle<usize>| !h.is_finished());
                    if let CycleOutcome::Dispatching(handle) = self.run_cycle().await {
                        pending.push(handle);
                    }
                }
                _ = shutdown.changed() => {
                    info!(pending = pending.len(), "prediction fetch loop shutting down");
                    for handle in pending {
                        handle.abort();
                    }
                    break;
                }
            }
        }
    }
}

/// Queue one placement task per window, each at the window's start.
///
/// Windows whose start has already passed are handled immediately.
/// Windows that rank no regions queue nothing.
pub async fn dispatch_windows(
    plan: DispatchPlan,
    cluster: Arc<dyn ClusterView>,
    queue: Arc<PlacementTaskQueue>,
    target_stores: Vec<StoreId>,
) -> usize {
    let mut queued = 0;

    for window in &plan.windows {
        let wait = window.start_time - epoch_secs();
        if wait > 0 {
            debug!(start = window.start_time, wait_secs = wait, "waiting for window");
            tokio::time::sleep(Duration::from_secs(wait as u64)).await;
        }

        let regions = cluster.regions();
        let ranked = rank_hot_regions(window, &plan.snapshot.table_info, &regions);
        if ranked.is_empty() {
            debug!(
                start = window.start_time,
                end = window.end_time,
                regions = regions.len(),
                "window ranked no regions"
            );
            continue;
        }

        queue.push(PlacementTask {
            region_ids: ranked,
            store_ids: target_stores.clone(),
            start_time: window.start_time,
            end_time: window.end_time,
        });
        queued += 1;
    }

    queued
}
