//! Scheduler construction.
//!
//! Schedulers are built from an explicit [`SchedulerKind`] rather than a
//! registry populated at load time.

use std::str::FromStr;

use hotspot_placement::PlacementTaskQueue;

use crate::error::SchedulerError;
use crate::region_scheduler::{RegionPlacementScheduler, SCHEDULER_TYPE};

/// Prefix of every per-task scheduler name; the task's queue position is
/// appended.
pub const SCHEDULER_NAME_PREFIX: &str = "move-region-use-scheduler-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerKind {
    RegionPlacement,
}

impl SchedulerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerKind::RegionPlacement => SCHEDULER_TYPE,
        }
    }
}

impl FromStr for SchedulerKind {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SCHEDULER_TYPE => Ok(SchedulerKind::RegionPlacement),
            other => Err(SchedulerError::UnknownSchedulerType(other.to_string())),
        }
    }
}

/// One scheduler per queued task, named by queue position.
pub fn create_user_schedulers(queue: &PlacementTaskQueue) -> Vec<RegionPlacementScheduler> {
    queue
        .snapshot()
        .into_iter()
        .enumerate()
        .map(|(i, task)| RegionPlacementScheduler::new(format!("{SCHEDULER_NAME_PREFIX}{i}"), task))
        .collect()
}

/// Build every scheduler of `kind` for the current queue.
pub fn create_schedulers(
    kind: SchedulerKind,
    queue: &PlacementTaskQueue,
) -> Vec<RegionPlacementScheduler> {
    match kind {
        SchedulerKind::RegionPlacement => create_user_schedulers(queue),
    }
}
