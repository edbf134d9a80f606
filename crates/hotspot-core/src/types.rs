//! Domain types for the hot-spot scheduling pipeline.
//!
//! The forecast payload types mirror the JSON served by the external
//! predictor. The remaining types are produced and consumed by the
//! pipeline stages in `hotspot-forecast` and `hotspot-placement`.
//! All timestamps are Unix epoch seconds.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Unique identifier for a region in the cluster.
pub type RegionId = u64;

/// Unique identifier for a store (node) in the cluster.
pub type StoreId = u64;

/// Index of a table (shard) within a forecast snapshot.
pub type TableIndex = usize;

// ── Forecast payload ───────────────────────────────────────────────

/// Per-table section of a forecast.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableForecast {
    /// Predicted load, one value per one-minute step.
    pub predict: Vec<f64>,
    /// Inclusive start of the table's key range (uppercase hex).
    pub start_key: String,
    /// Exclusive end of the table's key range. Empty means open-ended.
    pub end_key: String,
    #[serde(default)]
    pub max_value: f64,
    #[serde(default)]
    pub min_value: f64,
    #[serde(default)]
    pub history_r2_score: f64,
}

impl TableForecast {
    /// Whether `key` (uppercase hex) falls in `[start_key, end_key)`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.start_key.as_str() <= key && (self.end_key.is_empty() || self.end_key.as_str() > key)
    }
}

/// One response from the forecast service.
///
/// Immutable once fetched; each snapshot is consumed by exactly one
/// pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastSnapshot {
    /// Base timestamp the prediction steps are relative to.
    pub time: i64,
    /// Number of tables the forecast covers.
    pub table_num: i64,
    /// Number of one-minute prediction steps per table.
    pub predict_step: i64,
    #[serde(rename = "history_r2_score_tot", default)]
    pub history_r2_score_total: f64,
    pub table_info: Vec<TableForecast>,
    /// Replica count the predictor recommends for the cluster.
    #[serde(default)]
    pub replicas: i32,
}

impl ForecastSnapshot {
    /// Index of the table whose key range holds `key`, by linear scan.
    pub fn table_for_key(&self, key: &str) -> Option<TableIndex> {
        self.table_info.iter().position(|t| t.contains_key(key))
    }
}

// ── Pipeline intermediates ─────────────────────────────────────────

/// A contiguous future span during which one table is predicted hot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HotInterval {
    pub start_time: i64,
    pub end_time: i64,
    /// The table this interval belongs to.
    pub table: TableIndex,
}

impl HotInterval {
    /// Midpoint of the interval, truncated toward zero.
    pub fn midpoint(&self) -> i64 {
        (self.start_time + self.end_time) / 2
    }
}

/// One or more overlapping or nearby hot intervals, merged across tables.
///
/// The zero value stands for "no previous period" and seeds the very
/// first merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HotPeriod {
    pub start_time: i64,
    pub end_time: i64,
    /// Tables that contributed to this period, in merge order.
    pub tables: Vec<TableIndex>,
}

/// A future span during which a placement action should happen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub start_time: i64,
    pub end_time: i64,
    /// Per-table decay weight. 0 means no signal, 1 means hot inside
    /// the window, larger values mean weaker relevance.
    pub weights: Vec<u64>,
}

impl ScheduleWindow {
    /// Create a window with an all-zero weight vector for `tables` tables.
    pub fn new(start_time: i64, end_time: i64, tables: usize) -> Self {
        Self {
            start_time,
            end_time,
            weights: vec![0; tables],
        }
    }

    /// Whether `t` lies in the closed range `[start_time, end_time]`.
    pub fn contains(&self, t: i64) -> bool {
        t >= self.start_time && t <= self.end_time
    }

    /// Record an observed weight for a table.
    ///
    /// Keeps the minimum nonzero value seen. A zero observation carries
    /// no information and is ignored, as are out-of-range tables.
    pub fn record_weight(&mut self, table: TableIndex, weight: u64) {
        let Some(slot) = self.weights.get_mut(table) else {
            return;
        };
        if weight == 0 {
            return;
        }
        if *slot == 0 || weight < *slot {
            *slot = weight;
        }
    }

    /// Weight recorded for a table, or 0 when the table is unknown.
    pub fn weight(&self, table: TableIndex) -> u64 {
        self.weights.get(table).copied().unwrap_or(0)
    }
}

/// A request to move the leaders of some regions onto target stores
/// during a validity window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacementTask {
    /// Regions to act on, highest priority first.
    pub region_ids: Vec<RegionId>,
    /// Stores that should hold the leaders. The first one is preferred.
    pub store_ids: Vec<StoreId>,
    pub start_time: i64,
    pub end_time: i64,
}

impl PlacementTask {
    /// Whether `now` lies in the closed validity window.
    pub fn is_valid_at(&self, now: i64) -> bool {
        now >= self.start_time && now <= self.end_time
    }
}

/// Current wall-clock time in Unix epoch seconds.
pub fn epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
