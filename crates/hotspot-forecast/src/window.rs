//! Schedule window construction.
//!
//! A window opens in the quiet gap before each hot period and closes when
//! that period ends. Every hot interval then contributes a decay weight to
//! its table, based on where the interval's midpoint falls relative to the
//! window:
//!
//! ```text
//! mid inside [start, end]   → 1
//! mid after end             → ((mid - start) / 60)²
//! mid before start          → ((start - mid) / 60)³
//! ```
//!
//! Minutes are whole (truncated). Each table keeps the smallest nonzero
//! weight any of its intervals produced.

use tracing::debug;

use hotspot_core::{HotInterval, HotPeriod, ScheduleWindow};

use crate::{MERGE_GAP_SECS, STEP_SECS};

/// Build windows from merged periods (seed first) and weight them.
pub fn build_schedule_windows(
    periods: &[HotPeriod],
    intervals: &[HotInterval],
    base_time: i64,
    tables: usize,
) -> Vec<ScheduleWindow> {
    let mut windows: Vec<ScheduleWindow> = periods
        .windows(2)
        .filter(|pair| pair[1].start_time - pair[0].end_time > MERGE_GAP_SECS)
        .map(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            let start_time = if prev.end_time == 0 {
                base_time
            } else {
                (cur.start_time + prev.end_time) / 2
            };
            ScheduleWindow::new(start_time, cur.end_time, tables)
        })
        .collect();

    for window in &mut windows {
        for interval in intervals {
            let weight = decay_weight(interval.midpoint(), window);
            window.record_weight(interval.table, weight);
        }
    }

    debug!(count = windows.len(), "built schedule windows");
    windows
}

/// Temporal decay weight of a hot span centred at `mid` for `window`.
pub fn decay_weight(mid: i64, window: &ScheduleWindow) -> u64 {
    if window.contains(mid) {
        return 1;
    }
    if mid > window.end_time {
        let minutes = ((mid - window.start_time) / STEP_SECS) as u64;
        minutes.saturating_mul(minutes)
    } else {
        let minutes = ((window.start_time - mid) / STEP_SECS) as u64;
        minutes.saturating_mul(minutes).saturating_mul(minutes)
    }
}
