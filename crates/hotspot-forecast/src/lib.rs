//! hotspot-forecast: turns a load forecast into schedule windows.
//!
//! # Pipeline
//!
//! ```text
//! ForecastSnapshot
//!   ├── threshold::calculate_threshold     (20th-percentile of step means)
//!   ├── detector::detect_hot_intervals     (per-table spans above threshold)
//!   ├── merger::merge_periods              (cross-table periods, seeded by carry-over)
//!   └── window::build_schedule_windows     (windows + per-table decay weights)
//! ```
//!
//! Runs are not independent: the last merged period of one run seeds the
//! next. [`pipeline::plan_dispatch`] takes that carry-over explicitly and
//! returns the replacement, and [`pipeline::ForecastPipeline`] owns it
//! for callers that run cycles back to back.

pub mod detector;
pub mod error;
pub mod merger;
pub mod pipeline;
pub mod source;
pub mod threshold;
pub mod window;

pub use error::{ForecastError, ForecastResult};
pub use pipeline::{DispatchPlan, ForecastPipeline, plan_dispatch};
pub use source::{ForecastSource, HttpForecastSource};

/// Length of one prediction step in seconds.
pub const STEP_SECS: i64 = 60;

/// Hot spans closer than this (in seconds) belong to the same period.
pub const MERGE_GAP_SECS: i64 = 2 * 60;
