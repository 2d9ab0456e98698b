//! Approval endpoints.

use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{post, put};
use axum::{Extension, Json, Router};
use calitrack::db::entities::{approval, delivery};
use calitrack::workflow::inputs::{ApprovalInput, ReadyInput};
use calitrack::workflow::Transition;

use super::{created, ok, ApiResult, Caller, CreatedResult};
use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/approvals", post(create_approval))
        .route("/approvals/{id}/ready", put(mark_ready))
}

/// Record the customer's approval. The caller is the preparer.
async fn create_approval(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    payload: Result<Json<ApprovalInput>, JsonRejection>,
) -> CreatedResult<Transition<approval::Model>> {
    let Json(input) = payload?;
    created(state.workflow.create_approval(input, &caller).await?)
}

/// Mark the approved job ready for delivery. The body is optional.
async fn mark_ready(
    State(state): State<AppState>,
    Extension(Caller(caller)): Extension<Caller>,
    id: Result<Path<i32>, PathRejection>,
    body: Bytes,
) -> ApiResult<Transition<delivery::Model>> {
    let Path(approval_id) = id?;
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        ReadyInput::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(e.to_string()))?
    };
    ok(state.workflow.mark_ready(approval_id, input, &caller).await?)
}
