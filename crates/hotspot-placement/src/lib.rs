//! hotspot-placement: decides *which* regions to move for a window.
//!
//! This crate does NOT build operators (that's `hotspot-scheduler`).
//! It ranks regions against a schedule window and records the result as
//! placement tasks for the schedulers to act on.
//!
//! # Components
//!
//! - **`cluster`**: Read-only cluster view (regions, stores) and an in-memory implementation
//! - **`ranker`**: Decay-adjusted churn ranking with dynamic binning
//! - **`queue`**: Append-only, lock-guarded placement task list

pub mod cluster;
pub mod queue;
pub mod ranker;

pub use cluster::{ClusterSnapshot, ClusterView, MemoryCluster, Peer, RegionInfo, StoreInfo, StoreState, hex_region_key};
pub use queue::PlacementTaskQueue;
pub use ranker::{churn_metric, rank_hot_regions};
