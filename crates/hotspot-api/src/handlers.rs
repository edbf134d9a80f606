//! Status API handlers.
//!
//! Every handler only reads shared state and returns JSON in the
//! `{success, data, error}` envelope.

use std::sync::PoisonError;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use hotspot_core::{RegionId, ScheduleWindow, StoreId, epoch_secs};
use hotspot_scheduler::{Scheduler, create_user_schedulers};

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(Serialize)]
struct ApiResponse<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    queued_tasks: usize,
}

/// GET /healthz
pub async fn healthz(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(Health {
        status: "ok",
        queued_tasks: state.queue.len(),
    })
}

/// GET /api/v1/tasks
pub async fn list_tasks(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.queue.snapshot())
}

#[derive(Serialize)]
struct PlanSummary {
    time: i64,
    threshold: f64,
    replicas: i32,
    windows: Vec<ScheduleWindow>,
}

/// GET /api/v1/plan
pub async fn get_plan(State(state): State<ApiState>) -> impl IntoResponse {
    let guard = state.last_plan.read().unwrap_or_else(PoisonError::into_inner);
    match guard.as_ref() {
        Some(plan) => ApiResponse::ok(PlanSummary {
            time: plan.snapshot.time,
            threshold: plan.threshold,
            replicas: plan.snapshot.replicas,
            windows: plan.windows.clone(),
        })
        .into_response(),
        None => error_response("no plan yet", StatusCode::NOT_FOUND).into_response(),
    }
}

#[derive(Serialize)]
struct SchedulerSummary {
    name: String,
    #[serde(rename = "type")]
    scheduler_type: String,
    active: bool,
    start_time: i64,
    end_time: i64,
    region_ids: Vec<RegionId>,
    store_ids: Vec<StoreId>,
}

/// GET /api/v1/schedulers
pub async fn list_schedulers(State(state): State<ApiState>) -> impl IntoResponse {
    let now = epoch_secs();
    let summaries: Vec<SchedulerSummary> = create_user_schedulers(&state.queue)
        .into_iter()
        .map(|s| {
            let task = s.task();
            SchedulerSummary {
                name: s.name().to_string(),
                scheduler_type: s.scheduler_type().to_string(),
                active: task.is_valid_at(now),
                start_time: task.start_time,
                end_time: task.end_time,
                region_ids: task.region_ids.clone(),
                store_ids: task.store_ids.clone(),
            }
        })
        .collect();
    ApiResponse::ok(summaries)
}
