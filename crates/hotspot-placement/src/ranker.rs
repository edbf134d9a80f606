//! Hot region ranking for a schedule window.
//!
//! Each region is scored by its churn relative to its size and to the
//! decay weight of the table it belongs to:
//!
//! ```text
//! metric = rw_bytes_total / (weight[table] * approximate_size)
//! ```
//!
//! Instead of a full sort, the metric range is cut into equal-width bins
//! (one per region, width at least 1). Bin 0 holds the highest metrics.
//! Bins are drained in order until 10% of the region count is collected;
//! the last bin is cut off in insertion order, with no secondary sort.

use tracing::debug;

use hotspot_core::{RegionId, ScheduleWindow, TableForecast};

use crate::cluster::RegionInfo;

/// Churn metric for a region, or `None` when it cannot be scored.
///
/// Regions outside every table range, in a table with no signal for
/// this window, or with a zero size are not scored.
pub fn churn_metric(
    region: &RegionInfo,
    window: &ScheduleWindow,
    tables: &[TableForecast],
) -> Option<u64> {
    let key = region.hex_start_key();
    let table = tables.iter().position(|t| t.contains_key(&key))?;
    let denominator = window.weight(table).saturating_mul(region.approximate_size);
    if denominator == 0 {
        return None;
    }
    Some(region.rw_bytes_total() / denominator)
}

/// Select the hottest regions for `window`, highest churn first.
///
/// Returns at most `regions.len() / 10` ids, and nothing at all for
/// fewer than ten regions.
pub fn rank_hot_regions(
    window: &ScheduleWindow,
    tables: &[TableForecast],
    regions: &[RegionInfo],
) -> Vec<RegionId> {
    let quota = regions.len() / 10;
    if quota == 0 {
        debug!(regions = regions.len(), "too few regions to rank");
        return Vec::new();
    }

    let metrics: Vec<Option<u64>> = regions
        .iter()
        .map(|r| churn_metric(r, window, tables))
        .collect();

    let Some((min, max)) = metrics
        .iter()
        .flatten()
        .fold(None, |acc: Option<(u64, u64)>, &m| match acc {
            None => Some((m, m)),
            Some((lo, hi)) => Some((lo.min(m), hi.max(m))),
        })
    else {
        debug!("no region maps to a weighted table");
        return Vec::new();
    };

    let width = ((max - min) / regions.len() as u64).max(1);
    let mut bins: Vec<Vec<RegionId>> = vec![Vec::new(); ((max - min) / width) as usize + 1];

    for (region, metric) in regions.iter().zip(&metrics) {
        match metric {
            Some(m) if *m > 0 => bins[((max - m) / width) as usize].push(region.id),
            _ => {}
        }
    }

    let ranked: Vec<RegionId> = bins.into_iter().flatten().take(quota).collect();

    debug!(
        min,
        max,
        width,
        quota,
        selected = ranked.len(),
        "ranked hot regions"
    );
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Peer;

    fn open_table(start_key: &str, end_key: &str) -> TableForecast {
        TableForecast {
            predict: vec![],
            start_key: start_key.to_string(),
            end_key: end_key.to_string(),
            max_value: 0.0,
            min_value: 0.0,
            history_r2_score: 0.0,
        }
    }

    fn region(id: u64, start_key: &[u8], rw: u64, size: u64) -> RegionInfo {
        RegionInfo {
            id,
            start_key: start_key.to_vec(),
            end_key: vec![],
            peers: vec![Peer { id: id * 10, store_id: 1 }],
            leader: Some(Peer { id: id * 10, store_id: 1 }),
            approximate_size: size,
            read_bytes: rw,
            written_bytes: 0,
        }
    }

    fn window(weights: Vec<u64>) -> ScheduleWindow {
        ScheduleWindow { start_time: 0, end_time: 600, weights }
    }

    #[test]
    fn fewer_than_ten_regions_selects_none() {
        let tables = [open_table("", "")];
        let regions: Vec<RegionInfo> = (1..=9).map(|i| region(i, &[1], i * 100, 1)).collect();
        assert!(rank_hot_regions(&window(vec![1]), &tables, &regions).is_empty());
    }

    #[test]
    fn selects_top_tenth_highest_first() {
        let tables = [open_table("", "")];
        let regions: Vec<RegionInfo> = (1..=20).map(|i| region(i, &[1], i * 100, 1)).collect();
        let ranked = rank_hot_regions(&window(vec![1]), &tables, &regions);
        assert_eq!(ranked, vec![20, 19]);
    }

    #[test]
    fn never_exceeds_tenth_of_population() {
        let tables = [open_table("", "")];
        let regions: Vec<RegionInfo> = (1..=35).map(|i| region(i, &[1], 1000, 1)).collect();
        let ranked = rank_hot_regions(&window(vec![1]), &tables, &regions);
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn ties_are_cut_in_insertion_order() {
        let tables = [open_table("", "")];
        let regions: Vec<RegionInfo> = (1..=10).map(|i| region(i, &[1], 500, 1)).collect();
        let ranked = rank_hot_regions(&window(vec![1]), &tables, &regions);
        assert_eq!(ranked, vec![1]);
    }

    #[test]
    fn decay_weight_demotes_distant_tables() {
        // Table 0 covers keys below 0x80, table 1 the rest.
        let tables = [open_table("", "80"), open_table("80", "")];
        let mut regions: Vec<RegionInfo> = (1..=18).map(|i| region(i, &[0x10], 10, 1)).collect();
        // Same churn, but table 0 is hot inside the window and table 1 is not.
        regions.push(region(100, &[0x10], 6400, 1));
        regions.push(region(200, &[0x90], 6400, 1));

        let ranked = rank_hot_regions(&window(vec![1, 64]), &tables, &regions);
        assert_eq!(ranked[0], 100);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[1], 200);
    }

    #[test]
    fn unmapped_and_unweighted_regions_are_excluded() {
        let tables = [open_table("40", "80"), open_table("80", "")];
        let mut regions = Vec::new();
        // Below every table range.
        regions.extend((1..=10).map(|i| region(i, &[0x10], 1_000_000, 1)));
        // In table 1, which has no signal for this window.
        regions.extend((11..=20).map(|i| region(i, &[0x90], 1_000_000, 1)));
        // In table 0.
        regions.push(region(21, &[0x50], 10, 1));

        let ranked = rank_hot_regions(&window(vec![1, 0]), &tables, &regions);
        assert_eq!(ranked, vec![21]);
    }

    #[test]
    fn metric_divides_by_weight_and_size() {
        let tables = [open_table("", "")];
        let r = region(1, &[1], 1000, 10);
        assert_eq!(churn_metric(&r, &window(vec![4]), &tables), Some(25));
        assert_eq!(churn_metric(&r, &window(vec![0]), &tables), None);

        let empty = region(2, &[1], 1000, 0);
        assert_eq!(churn_metric(&empty, &window(vec![4]), &tables), None);
    }
}
