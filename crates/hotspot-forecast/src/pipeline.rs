//! One forecast-to-windows pipeline run.
//!
//! Runs must execute one after another: the last merged period of a run
//! seeds the next run's merge. [`plan_dispatch`] makes that dependency
//! explicit by taking the carry-over and returning its replacement. A
//! failed run returns an error and leaves the caller's carry-over as is.

use serde::Serialize;
use tracing::info;

use hotspot_core::{ForecastSnapshot, HotPeriod, ScheduleWindow};

use crate::detector::detect_all;
use crate::error::ForecastResult;
use crate::merger::{merge_periods, sort_intervals};
use crate::threshold::{calculate_threshold, validate};
use crate::window::build_schedule_windows;

/// Output of a successful pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchPlan {
    /// The forecast the plan was derived from; its table key ranges are
    /// needed again when ranking regions for each window.
    pub snapshot: ForecastSnapshot,
    pub threshold: f64,
    pub windows: Vec<ScheduleWindow>,
}

/// Run the pipeline for one snapshot.
///
/// Returns the plan together with the period that should seed the next
/// run.
pub fn plan_dispatch(
    snapshot: ForecastSnapshot,
    carry: &HotPeriod,
) -> ForecastResult<(DispatchPlan, HotPeriod)> {
    let (tables, steps) = validate(&snapshot)?;
    let threshold = calculate_threshold(&snapshot)?;

    let mut intervals = detect_all(&snapshot, threshold, tables, steps);
    sort_intervals(&mut intervals);

    let periods = merge_periods(&intervals, carry.clone())?;
    let windows = build_schedule_windows(&periods, &intervals, snapshot.time, tables);
    let next_carry = periods.last().cloned().unwrap_or_default();

    info!(
        time = snapshot.time,
        threshold,
        intervals = intervals.len(),
        periods = periods.len() - 1,
        windows = windows.len(),
        "forecast planned"
    );

    Ok((
        DispatchPlan {
            snapshot,
            threshold,
            windows,
        },
        next_carry,
    ))
}

/// Owns the carry-over period between sequential runs.
///
/// `run` takes `&mut self`, so two runs can never overlap.
#[derive(Debug, Default)]
pub struct ForecastPipeline {
    carry: HotPeriod,
}

impl ForecastPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known carry-over instead of the zero period.
    pub fn with_carry(carry: HotPeriod) -> Self {
        Self { carry }
    }

    /// Run one cycle. The carry-over only advances on success.
    pub fn run(&mut self, snapshot: ForecastSnapshot) -> ForecastResult<DispatchPlan> {
        let (plan, next) = plan_dispatch(snapshot, &self.carry)?;
        self.carry = next;
        Ok(plan)
    }

    pub fn carry(&self) -> &HotPeriod {
        &self.carry
    }
}
