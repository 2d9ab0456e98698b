//! Job request numbering and certificates.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use calitrack::db::entities::certificate;
use calitrack::workflow::inputs::{CertificateInput, JobRequestInput};
use calitrack::workflow::JobRequestView;

use super::{created, ok, ApiResult, Caller, CreatedResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/job-requests/generate", post(generate))
        .route("/job-requests/{id}", get(get_job_request))
        .route("/job-requests/{id}/certificates", get(list_certificates))
        .route("/certificates", post(issue_certificate))
}

/// Issue the next job request number and create the request.
async fn generate(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    payload: Result<Json<JobRequestInput>, JsonRejection>,
) -> CreatedResult<JobRequestView> {
    let Json(input) = payload?;
    created(state.workflow.generate_job_request(input, &caller).await?)
}

async fn get_job_request(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<JobRequestView> {
    let Path(id) = id?;
    ok(state.workflow.get_job_request(id).await?)
}

async fn list_certificates(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Vec<certificate::Model>> {
    let Path(id) = id?;
    ok(state.workflow.list_certificates(id).await?)
}

/// Number and store a certificate for a job request.
async fn issue_certificate(
    State(state): State<AppState>,
    payload: Result<Json<CertificateInput>, JsonRejection>,
) -> CreatedResult<certificate::Model> {
    let Json(input) = payload?;
    created(state.workflow.issue_certificate(input).await?)
}
