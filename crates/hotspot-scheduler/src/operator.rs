//! Scheduling operators.
//!
//! An [`Operator`] is a sequence of steps the cluster executes against one
//! region. Two shapes are produced here:
//!
//! - **transfer leader**: the target already holds a replica; hand it the
//!   leadership in one step.
//! - **move leader**: the target has no replica; add a learner there,
//!   promote it, transfer leadership to it, and drop the old leader's peer.

use serde::Serialize;

use hotspot_core::{RegionId, StoreId};
use hotspot_placement::RegionInfo;

use crate::error::{SchedulerError, SchedulerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    TransferLeader,
    MoveLeader,
}

impl OperatorKind {
    /// Whether the operator changes replica placement, and so counts
    /// against the region schedule limit.
    pub fn is_region(&self) -> bool {
        matches!(self, OperatorKind::MoveLeader)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum OpStep {
    TransferLeader { from_store: StoreId, to_store: StoreId },
    AddLearner { to_store: StoreId, peer_id: u64 },
    PromoteLearner { to_store: StoreId, peer_id: u64 },
    RemovePeer { from_store: StoreId },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityLevel {
    Low,
    #[default]
    Normal,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operator {
    /// Type tag of the scheduler that created the operator.
    pub desc: String,
    pub region_id: RegionId,
    pub kind: OperatorKind,
    pub steps: Vec<OpStep>,
    pub priority: PriorityLevel,
}

impl Operator {
    pub fn set_priority_level(&mut self, level: PriorityLevel) {
        self.priority = level;
    }

    /// Store that ends up holding the leader.
    pub fn target_store(&self) -> Option<StoreId> {
        self.steps.iter().find_map(|s| match s {
            OpStep::TransferLeader { to_store, .. } => Some(*to_store),
            _ => None,
        })
    }
}

fn construction_failed(region: &RegionInfo, reason: impl Into<String>) -> SchedulerError {
    SchedulerError::OperatorConstructionFailed {
        region_id: region.id,
        reason: reason.into(),
    }
}

fn check_leader(region: &RegionInfo, source: StoreId) -> SchedulerResult<()> {
    match region.leader_store_id() {
        Some(leader) if leader == source => Ok(()),
        Some(leader) => Err(construction_failed(
            region,
            format!("leader is on store {leader}, not {source}"),
        )),
        None => Err(construction_failed(region, "region has no leader")),
    }
}

/// Build a one-step leadership transfer from `source` to `target`.
pub fn create_transfer_leader_operator(
    desc: &str,
    region: &RegionInfo,
    source: StoreId,
    target: StoreId,
) -> SchedulerResult<Operator> {
    check_leader(region, source)?;
    if !region.has_peer_on(target) {
        return Err(construction_failed(
            region,
            format!("store {target} holds no replica"),
        ));
    }

    Ok(Operator {
        desc: desc.to_string(),
        region_id: region.id,
        kind: OperatorKind::TransferLeader,
        steps: vec![OpStep::TransferLeader {
            from_store: source,
            to_store: target,
        }],
        priority: PriorityLevel::Normal,
    })
}

/// Build a leader move onto a store that does not yet hold a replica.
///
/// `peer_id` is the freshly allocated id for the new replica.
pub fn create_move_leader_operator(
    desc: &str,
    region: &RegionInfo,
    source: StoreId,
    target: StoreId,
    peer_id: u64,
) -> SchedulerResult<Operator> {
    check_leader(region, source)?;
    if region.has_peer_on(target) {
        return Err(construction_failed(
            region,
            format!("store {target} already holds a replica"),
        ));
    }

    Ok(Operator {
        desc: desc.to_string(),
        region_id: region.id,
        kind: OperatorKind::MoveLeader,
        steps: vec![
            OpStep::AddLearner {
                to_store: target,
                peer_id,
            },
            OpStep::PromoteLearner {
                to_store: target,
                peer_id,
            },
            OpStep::TransferLeader {
                from_store: source,
                to_store: target,
            },
            OpStep::RemovePeer { from_store: source },
        ],
        priority: PriorityLevel::Normal,
    })
}
