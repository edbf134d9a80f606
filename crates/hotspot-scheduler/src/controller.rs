//! In-flight operator bookkeeping.
//!
//! The host hands every emitted operator to the [`OperatorController`],
//! which keeps at most one operator per region and exposes the in-flight
//! region-operator count used for admission.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info};

use hotspot_core::RegionId;

use crate::operator::Operator;

#[derive(Debug, Default)]
pub struct OperatorController {
    operators: Mutex<HashMap<RegionId, Operator>>,
}

impl OperatorController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an operator. Returns `false` (and drops it) when the
    /// region already has one in flight.
    pub fn add_operator(&self, op: Operator) -> bool {
        let mut ops = self.operators.lock().unwrap_or_else(PoisonError::into_inner);
        if ops.contains_key(&op.region_id) {
            debug!(region_id = op.region_id, "region already has an operator in flight");
            return false;
        }
        info!(
            region_id = op.region_id,
            kind = ?op.kind,
            priority = ?op.priority,
            desc = %op.desc,
            "operator added"
        );
        ops.insert(op.region_id, op);
        true
    }

    /// Stop tracking the operator for `region_id`.
    pub fn finish_operator(&self, region_id: RegionId) -> Option<Operator> {
        self.operators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&region_id)
    }

    /// Stop tracking every operator, returning them.
    pub fn drain(&self) -> Vec<Operator> {
        let mut ops = self.operators.lock().unwrap_or_else(PoisonError::into_inner);
        ops.drain().map(|(_, op)| op).collect()
    }

    /// Number of in-flight operators that count against the region
    /// schedule limit.
    pub fn region_operator_count(&self) -> u64 {
        self.operators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|op| op.kind.is_region())
            .count() as u64
    }

    /// Number of in-flight operators of any kind.
    pub fn operator_count(&self) -> usize {
        self.operators.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn get(&self, region_id: RegionId) -> Option<Operator> {
        self.operators
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&region_id)
            .cloned()
    }
}
