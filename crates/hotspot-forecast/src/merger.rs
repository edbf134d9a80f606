//! Hot period merging.
//!
//! Sorts hot intervals from all tables by start time and folds them into
//! periods with a single forward pass. An interval starting more than
//! [`MERGE_GAP_SECS`] after the running period's end closes that period.
//!
//! The returned list always starts with the seed period carried over from
//! the previous run (zero-valued on the first run), so that the window
//! builder can measure the gap between consecutive fetches.

use tracing::debug;

use hotspot_core::{HotInterval, HotPeriod};

use crate::MERGE_GAP_SECS;
use crate::error::{ForecastError, ForecastResult};

/// Sort intervals by start time, keeping input order on ties.
pub fn sort_intervals(intervals: &mut [HotInterval]) {
    intervals.sort_by_key(|h| h.start_time);
}

/// Merge sorted intervals into periods, prefixed with `seed`.
///
/// `intervals` must already be sorted (see [`sort_intervals`]). Fails with
/// [`ForecastError::NoHotSignal`] when there is nothing to merge.
pub fn merge_periods(intervals: &[HotInterval], seed: HotPeriod) -> ForecastResult<Vec<HotPeriod>> {
    let Some(first) = intervals.first() else {
        return Err(ForecastError::NoHotSignal);
    };

    let mut periods = vec![seed];
    let mut running = HotPeriod {
        start_time: first.start_time,
        end_time: first.end_time,
        tables: Vec::new(),
    };

    for interval in intervals {
        if interval.start_time - running.end_time > MERGE_GAP_SECS {
            let next = HotPeriod {
                start_time: interval.start_time,
                end_time: interval.end_time,
                tables: vec![interval.table],
            };
            periods.push(std::mem::replace(&mut running, next));
        } else {
            running.end_time = running.end_time.max(interval.end_time);
            running.tables.push(interval.table);
        }
    }
    periods.push(running);

    debug!(periods = periods.len() - 1, "merged hot periods");
    Ok(periods)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start_time: i64, end_time: i64, table: usize) -> HotInterval {
        HotInterval { start_time, end_time, table }
    }

    #[test]
    fn empty_input_is_no_hot_signal() {
        assert!(matches!(
            merge_periods(&[], HotPeriod::default()),
            Err(ForecastError::NoHotSignal)
        ));
    }

    #[test]
    fn small_gap_merges_and_large_gap_splits() {
        let intervals = [iv(0, 60, 0), iv(100, 160, 1), iv(400, 460, 2)];
        let periods = merge_periods(&intervals, HotPeriod::default()).unwrap();

        assert_eq!(periods.len(), 3);
        assert_eq!(periods[0], HotPeriod::default());
        assert_eq!(
            periods[1],
            HotPeriod { start_time: 0, end_time: 160, tables: vec![0, 1] }
        );
        assert_eq!(
            periods[2],
            HotPeriod { start_time: 400, end_time: 460, tables: vec![2] }
        );
    }

    #[test]
    fn gap_of_exactly_two_minutes_merges() {
        let intervals = [iv(0, 60, 0), iv(180, 240, 1)];
        let periods = merge_periods(&intervals, HotPeriod::default()).unwrap();
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[1].end_time, 240);
    }

    #[test]
    fn gap_just_over_two_minutes_splits() {
        let intervals = [iv(0, 60, 0), iv(181, 240, 1)];
        let periods = merge_periods(&intervals, HotPeriod::default()).unwrap();
        assert_eq!(periods.len(), 3);
    }

    #[test]
    fn contained_interval_does_not_shrink_period() {
        let intervals = [iv(0, 600, 0), iv(60, 120, 1)];
        let periods = merge_periods(&intervals, HotPeriod::default()).unwrap();
        assert_eq!(periods[1].end_time, 600);
        assert_eq!(periods[1].tables, vec![0, 1]);
    }

    #[test]
    fn seed_is_first_element() {
        let seed = HotPeriod { start_time: 10, end_time: 20, tables: vec![4] };
        let periods = merge_periods(&[iv(1000, 1060, 0)], seed.clone()).unwrap();
        assert_eq!(periods[0], seed);
        assert_eq!(periods.last().unwrap().start_time, 1000);
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut intervals = vec![iv(300, 360, 0), iv(60, 120, 1), iv(60, 90, 2)];
        sort_intervals(&mut intervals);
        let tables: Vec<usize> = intervals.iter().map(|h| h.table).collect();
        assert_eq!(tables, vec![1, 2, 0]);
    }
}
