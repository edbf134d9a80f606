//! Hot interval detection.
//!
//! Walks one table's prediction series and emits a [`HotInterval`] for
//! each run of steps above the threshold. A run opens at
//! `base + (j + 1) * 60` on the first hot step `j`, and closes at
//! `base + j * 60` on the first cool step, or on the final step if the
//! series ends hot.

use tracing::debug;

use hotspot_core::{ForecastSnapshot, HotInterval, TableIndex};

use crate::STEP_SECS;

/// Detect the hot intervals of a single table's series.
pub fn detect_hot_intervals(
    series: &[f64],
    threshold: f64,
    base_time: i64,
    table: TableIndex,
) -> Vec<HotInterval> {
    let mut intervals = Vec::new();
    let mut open: Option<i64> = None;
    let last = series.len().saturating_sub(1);

    for (j, &value) in series.iter().enumerate() {
        let hot = value > threshold;
        let step = j as i64;

        if hot && open.is_none() {
            open = Some((step + 1) * STEP_SECS + base_time);
        }

        if let Some(start_time) = open
            && (!hot || j == last)
        {
            intervals.push(HotInterval {
                start_time,
                end_time: step * STEP_SECS + base_time,
                table,
            });
            open = None;
        }
    }

    intervals
}

/// Detect hot intervals for every table in a validated snapshot.
///
/// Only the first `tables` tables and `steps` steps are considered.
pub fn detect_all(
    snapshot: &ForecastSnapshot,
    threshold: f64,
    tables: usize,
    steps: usize,
) -> Vec<HotInterval> {
    let intervals: Vec<HotInterval> = snapshot
        .table_info
        .iter()
        .take(tables)
        .enumerate()
        .flat_map(|(i, t)| {
            detect_hot_intervals(&t.predict[..steps], threshold, snapshot.time, i)
        })
        .collect();

    debug!(count = intervals.len(), threshold, "detected hot intervals");
    intervals
}
