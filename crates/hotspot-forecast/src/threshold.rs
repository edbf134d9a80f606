//! Load threshold estimation.
//!
//! The threshold is an approximate 20th percentile of the per-step mean
//! load across all tables: the step means are sorted ascending and the
//! values at positions `T/5` and `T/5 + 1` are averaged.

use tracing::debug;

use hotspot_core::ForecastSnapshot;

use crate::STEP_SECS;
use crate::error::{ForecastError, ForecastResult};

/// Largest magnitude a forecast timestamp may have. Midpoints add two
/// timestamps, so the horizon must stay well clear of `i64` limits.
const MAX_TIME_SECS: i64 = i64::MAX / 4;

/// Check a snapshot's shape and return `(tables, steps)`.
///
/// Rejects non-positive counts and any table whose prediction series is
/// shorter than the advertised step count, and any horizon whose
/// timestamps would not fit in `i64` arithmetic downstream.
pub fn validate(snapshot: &ForecastSnapshot) -> ForecastResult<(usize, usize)> {
    if snapshot.predict_step <= 0 || snapshot.table_num <= 0 {
        return Err(ForecastError::InvalidForecast(format!(
            "predict_step={} table_num={} must both be positive",
            snapshot.predict_step, snapshot.table_num
        )));
    }
    let horizon_end = snapshot
        .predict_step
        .checked_add(1)
        .and_then(|n| n.checked_mul(STEP_SECS))
        .and_then(|span| snapshot.time.checked_add(span))
        .filter(|end| *end <= MAX_TIME_SECS && snapshot.time >= -MAX_TIME_SECS);
    if horizon_end.is_none() {
        return Err(ForecastError::InvalidForecast(format!(
            "time={} with predict_step={} is out of range",
            snapshot.time, snapshot.predict_step
        )));
    }

    let tables = snapshot.table_num as usize;
    let steps = snapshot.predict_step as usize;

    if snapshot.table_info.len() < tables {
        return Err(ForecastError::InvalidForecast(format!(
            "table_num={tables} but only {} tables present",
            snapshot.table_info.len()
        )));
    }
    if let Some((i, t)) = snapshot
        .table_info
        .iter()
        .take(tables)
        .enumerate()
        .find(|(_, t)| t.predict.len() < steps)
    {
        return Err(ForecastError::InvalidForecast(format!(
            "table {i} has {} predictions, expected {steps}",
            t.predict.len()
        )));
    }

    Ok((tables, steps))
}

/// Compute the hot-load threshold for a snapshot.
pub fn calculate_threshold(snapshot: &ForecastSnapshot) -> ForecastResult<f64> {
    let (tables, steps) = validate(snapshot)?;

    let mut step_means: Vec<f64> = (0..steps)
        .map(|step| {
            let total: f64 = snapshot
                .table_info
                .iter()
                .take(tables)
                .map(|t| t.predict[step])
                .sum();
            total / tables as f64
        })
        .collect();
    step_means.sort_by(f64::total_cmp);

    let lo = steps / 5;
    // Single-step forecasts have no upper neighbour.
    let hi = (lo + 1).min(steps - 1);
    let threshold = (step_means[lo] + step_means[hi]) / 2.0;

    debug!(threshold, steps, tables, "calculated load threshold");
    Ok(threshold)
}
