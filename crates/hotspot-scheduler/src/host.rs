//! Host polling loop.
//!
//! On every tick the host materialises one scheduler per queued task, asks
//! each admissible one for an operator, and hands the result to the
//! [`OperatorController`]. In dry-run mode nothing is executed: operators
//! are logged and drained at the start of the next tick.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use hotspot_core::epoch_secs;
use hotspot_placement::{ClusterView, PlacementTaskQueue};

use crate::controller::OperatorController;
use crate::factory::{SchedulerKind, create_schedulers};
use crate::operator::Operator;
use crate::region_scheduler::Scheduler;

pub struct ScheduleHost {
    cluster: Arc<dyn ClusterView>,
    queue: Arc<PlacementTaskQueue>,
    controller: Arc<OperatorController>,
    dry_run: bool,
}

impl ScheduleHost {
    pub fn new(cluster: Arc<dyn ClusterView>, queue: Arc<PlacementTaskQueue>) -> Self {
        Self {
            cluster,
            queue,
            controller: Arc::new(OperatorController::new()),
            dry_run: true,
        }
    }

    /// Keep operators in flight until [`OperatorController::finish_operator`]
    /// is called instead of draining them every tick.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn controller(&self) -> &Arc<OperatorController> {
        &self.controller
    }

    /// Run one scheduling pass at time `now`. Returns the operators that
    /// were accepted by the controller.
    pub fn tick(&self, now: i64) -> Vec<Operator> {
        if self.dry_run {
            let drained = self.controller.drain();
            if !drained.is_empty() {
                debug!(count = drained.len(), "dry run: dropped operators from previous tick");
            }
        }

        let limit = self.cluster.region_schedule_limit();
        let mut emitted = Vec::new();

        for scheduler in create_schedulers(SchedulerKind::RegionPlacement, &self.queue) {
            let in_flight = self.controller.region_operator_count();
            if !scheduler.is_schedule_allowed(now, limit, in_flight) {
                continue;
            }
            if let Some(op) = scheduler.schedule(self.cluster.as_ref())
                && self.controller.add_operator(op.clone())
            {
                emitted.push(op);
            }
        }

        if !emitted.is_empty() {
            info!(
                count = emitted.len(),
                in_flight = self.controller.region_operator_count(),
                limit,
                "scheduling tick emitted operators"
            );
        }
        emitted
    }

    /// Tick every `interval` until `shutdown` fires.
    pub async fn run(&self, interval: Duration, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        info!(
            interval_ms = interval.as_millis() as u64,
            dry_run = self.dry_run,
            "schedule host started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    self.tick(epoch_secs());
                }
                _ = shutdown.changed() => {
                    info!("schedule host shutting down");
                    break;
                }
            }
        }
    }
}
