//! Job endpoints: intake, inspection, generic status changes, delivery and
//! the read views.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, patch, post, put};
use axum::{Extension, Json, Router};
use calitrack::db::entities::{delivery, job};
use calitrack::workflow::inputs::{CreateJobInput, DeliveryInput, InspectionInput, StatusChangeInput};
use calitrack::workflow::{
    CreatedJob, DashboardSummary, InspectionRecord, JobStatus, JobView, Transition,
};
use serde::Deserialize;

use super::{created, ok, ApiResult, Caller, CreatedResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(create_job).get(list_jobs))
        .route("/jobs/summary", get(summary))
        .route("/jobs/inspections", post(submit_inspection))
        .route("/jobs/{id}", get(get_job))
        .route("/jobs/{id}/status", patch(change_status))
        .route("/jobs/{id}/delivery", put(record_delivery))
        .route("/deliveries/{id}/delivery", put(record_delivery))
}

#[derive(Debug, Deserialize)]
struct JobListQuery {
    status: Option<String>,
}

/// Take a job in. It starts in `pending_inspection`.
async fn create_job(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    payload: Result<Json<CreateJobInput>, JsonRejection>,
) -> CreatedResult<CreatedJob> {
    let Json(input) = payload?;
    created(state.workflow.create_job(input, &caller).await?)
}

/// List jobs, newest first, optionally for one status.
async fn list_jobs(
    State(state): State<AppState>,
    query: Result<Query<JobListQuery>, QueryRejection>,
) -> ApiResult<Vec<JobView>> {
    let Query(query) = query?;
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<JobStatus>)
        .transpose()?;
    ok(state.workflow.list_jobs(status).await?)
}

/// Job counts per status for the dashboard.
async fn summary(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    ok(state.workflow.dashboard().await?)
}

async fn get_job(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<JobView> {
    let Path(id) = id?;
    ok(state.workflow.get_job(id).await?)
}

/// Record an inspection and its spare parts.
async fn submit_inspection(
    State(state): State<AppState>,
    payload: Result<Json<InspectionInput>, JsonRejection>,
) -> CreatedResult<Transition<InspectionRecord>> {
    let Json(input) = payload?;
    created(state.workflow.submit_inspection(input).await?)
}

async fn change_status(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<StatusChangeInput>, JsonRejection>,
) -> ApiResult<Transition<job::Model>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    ok(state.workflow.change_status(id, input).await?)
}

/// Upsert delivery and invoice details of a job.
async fn record_delivery(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<DeliveryInput>, JsonRejection>,
) -> ApiResult<Transition<delivery::Model>> {
    let Path(job_id) = id?;
    let Json(input) = payload?;
    ok(state.workflow.record_delivery(job_id, input).await?)
}
