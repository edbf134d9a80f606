//! Scheduler error types.

use thiserror::Error;

use hotspot_core::RegionId;

/// Errors raised while turning placement tasks into operators.
///
/// None of these escape [`crate::Scheduler::schedule`]: a failing region
/// is logged and skipped, and the scan moves on.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("region not found: {0}")]
    RegionNotFound(RegionId),

    #[error("failed to build operator for region {region_id}: {reason}")]
    OperatorConstructionFailed { region_id: RegionId, reason: String },

    #[error("unknown scheduler type: {0}")]
    UnknownSchedulerType(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
