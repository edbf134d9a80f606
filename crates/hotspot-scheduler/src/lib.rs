//! hotspot-scheduler: turns placement tasks into scheduling operators.
//!
//! Each queued `PlacementTask` becomes one [`RegionPlacementScheduler`].
//! The host polls every scheduler on each tick; an admissible scheduler
//! emits at most one operator, which the [`OperatorController`] tracks
//! until it finishes. The [`PredictionFetchLoop`] keeps the task queue
//! filled from the forecast service.
//!
//! # Architecture
//!
//! ```text
//! PredictionFetchLoop
//!   ├── ForecastSource (fetch snapshot every interval)
//!   ├── ForecastPipeline (threshold → intervals → periods → windows)
//!   └── window dispatcher (sleep → rank_hot_regions → PlacementTaskQueue)
//!
//! ScheduleHost (every tick)
//!   ├── factory::create_schedulers (one scheduler per queued task)
//!   ├── Scheduler::is_schedule_allowed (window + region operator limit)
//!   ├── Scheduler::schedule (filters → transfer / move leader operator)
//!   └── OperatorController (one in-flight operator per region)
//! ```

pub mod controller;
pub mod error;
pub mod factory;
pub mod fetch_loop;
pub mod filter;
pub mod host;
pub mod operator;
pub mod region_scheduler;

pub use controller::OperatorController;
pub use error::{SchedulerError, SchedulerResult};
pub use factory::{SchedulerKind, create_schedulers, create_user_schedulers};
pub use fetch_loop::{CycleOutcome, PredictionFetchLoop, SharedPlan, dispatch_windows};
pub use filter::StoreStateFilter;
pub use host::ScheduleHost;
pub use operator::{OpStep, Operator, OperatorKind, PriorityLevel};
pub use region_scheduler::{RegionPlacementScheduler, SCHEDULER_TYPE, Scheduler};
