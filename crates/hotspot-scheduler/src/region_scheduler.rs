//! Per-task region placement scheduler.
//!
//! One [`RegionPlacementScheduler`] exists per queued [`PlacementTask`]. Inside
//! the task's validity window it walks the task's regions in ranking order and
//! emits at most one operator per call, moving the first out-of-place leader
//! onto the first target store.

use tracing::{debug, error, info};

use hotspot_core::{PlacementTask, RegionId, StoreId};
use hotspot_placement::{ClusterView, RegionInfo};

use crate::error::{SchedulerError, SchedulerResult};
use crate::filter::StoreStateFilter;
use crate::operator::{
    Operator, PriorityLevel, create_move_leader_operator, create_transfer_leader_operator,
};

/// Type tag shared by every region placement scheduler.
pub const SCHEDULER_TYPE: &str = "user-move-region";

/// A scheduler the host polls on every tick.
pub trait Scheduler: Send + Sync {
    fn name(&self) -> &str;

    fn scheduler_type(&self) -> &str;

    /// Admission check, re-evaluated on every call.
    fn is_schedule_allowed(&self, now: i64, region_schedule_limit: u64, in_flight: u64) -> bool;

    /// Produce at most one operator. `None` means nothing to do this tick.
    fn schedule(&self, cluster: &dyn ClusterView) -> Option<Operator>;
}

#[derive(Debug, Clone)]
pub struct RegionPlacementScheduler {
    name: String,
    task: PlacementTask,
}

impl RegionPlacementScheduler {
    pub fn new(name: impl Into<String>, task: PlacementTask) -> Self {
        let name = name.into();
        debug!(%name, regions = ?task.region_ids, "region placement scheduler created");
        Self { name, task }
    }

    pub fn task(&self) -> &PlacementTask {
        &self.task
    }

    /// True iff `now` lies in the task window and the cluster still has
    /// room for another region operator.
    pub fn is_admissible(&self, now: i64, region_schedule_limit: u64, in_flight: u64) -> bool {
        self.task.is_valid_at(now) && in_flight < region_schedule_limit
    }

    fn plan_region(
        &self,
        cluster: &dyn ClusterView,
        region_id: RegionId,
        target: StoreId,
    ) -> SchedulerResult<Option<Operator>> {
        let region = cluster
            .region(region_id)
            .ok_or(SchedulerError::RegionNotFound(region_id))?;

        let Some(source) = region.leader_store_id() else {
            debug!(scheduler = %self.name, region_id, "region has no leader, skipping");
            return Ok(None);
        };
        if self.task.store_ids.contains(&source) {
            return Ok(None);
        }

        if region.has_peer_on(target) {
            self.transfer_leader(cluster, &region, source, target)
        } else {
            self.move_leader(cluster, &region, source, target)
        }
    }

    fn transfer_leader(
        &self,
        cluster: &dyn ClusterView,
        region: &RegionInfo,
        source: StoreId,
        target: StoreId,
    ) -> SchedulerResult<Option<Operator>> {
        let filter = StoreStateFilter::transfer_leader();
        if !self.passes(&filter, cluster, region.id, source, target) {
            return Ok(None);
        }
        create_transfer_leader_operator(SCHEDULER_TYPE, region, source, target).map(Some)
    }

    fn move_leader(
        &self,
        cluster: &dyn ClusterView,
        region: &RegionInfo,
        source: StoreId,
        target: StoreId,
    ) -> SchedulerResult<Option<Operator>> {
        let filter = StoreStateFilter::move_region();
        if !self.passes(&filter, cluster, region.id, source, target) {
            return Ok(None);
        }
        let peer_id = cluster
            .alloc_peer_id()
            .ok_or_else(|| SchedulerError::OperatorConstructionFailed {
                region_id: region.id,
                reason: format!("failed to allocate peer on store {target}"),
            })?;
        create_move_leader_operator(SCHEDULER_TYPE, region, source, target, peer_id).map(Some)
    }

    fn passes(
        &self,
        filter: &StoreStateFilter,
        cluster: &dyn ClusterView,
        region_id: RegionId,
        source: StoreId,
        target: StoreId,
    ) -> bool {
        if !filter.allows_source(cluster.store(source).as_ref()) {
            debug!(scheduler = %self.name, region_id, store_id = source, "source store filtered");
            return false;
        }
        if !filter.allows_target(cluster.store(target).as_ref()) {
            debug!(scheduler = %self.name, region_id, store_id = target, "target store filtered");
            return false;
        }
        true
    }
}

impl Scheduler for RegionPlacementScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn scheduler_type(&self) -> &str {
        SCHEDULER_TYPE
    }

    fn is_schedule_allowed(&self, now: i64, region_schedule_limit: u64, in_flight: u64) -> bool {
        self.is_admissible(now, region_schedule_limit, in_flight)
    }

    fn schedule(&self, cluster: &dyn ClusterView) -> Option<Operator> {
        let &target = self.task.store_ids.first()?;

        for &region_id in &self.task.region_ids {
            match self.plan_region(cluster, region_id, target) {
                Ok(Some(mut op)) => {
                    op.set_priority_level(PriorityLevel::High);
                    info!(
                        scheduler = %self.name,
                        region_id,
                        kind = ?op.kind,
                        target_store = target,
                        "placement operator created"
                    );
                    return Some(op);
                }
                Ok(None) => {}
                Err(e @ SchedulerError::RegionNotFound(_)) => {
                    debug!(scheduler = %self.name, error = %e, "skipping region");
                }
                Err(e) => {
                    error!(scheduler = %self.name, region_id, error = %e, "failed to create operator");
                }
            }
        }
        None
    }
}
