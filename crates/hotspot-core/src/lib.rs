//! hotspot-core: shared domain types and configuration.
//!
//! Everything that crosses a crate boundary in the hot-spot scheduling
//! pipeline lives here: the forecast payload, the intermediate interval
//! and period records, schedule windows, and placement tasks.

pub mod config;
pub mod types;

pub use config::{HotspotConfig, RunMode, parse_duration};
pub use types::*;
