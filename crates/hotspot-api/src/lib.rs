//! hotspot-api: read-only status API for the hotspot daemon.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/healthz` | Liveness probe |
//! | GET | `/api/v1/tasks` | Queued placement tasks |
//! | GET | `/api/v1/plan` | Most recent dispatch plan |
//! | GET | `/api/v1/schedulers` | Schedulers materialised from the queue |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use hotspot_placement::PlacementTaskQueue;
use hotspot_scheduler::SharedPlan;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub queue: Arc<PlacementTaskQueue>,
    pub last_plan: SharedPlan,
}

/// Build the complete API router.
pub fn build_router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/tasks", get(handlers::list_tasks))
        .route("/plan", get(handlers::get_plan))
        .route("/schedulers", get(handlers::list_schedulers));

    Router::new()
        .route("/healthz", get(handlers::healthz))
        .nest("/api/v1", api_routes)
        .with_state(state)
}
