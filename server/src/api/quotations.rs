use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use calitrack::db::entities::quotation;
use calitrack::workflow::inputs::QuotationInput;
use calitrack::workflow::Transition;

use super::{created, CreatedResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/quotations", post(create_quotation))
}

/// Send a quotation. Duplicate quotation numbers are rejected with 409.
async fn create_quotation(
    State(state): State<AppState>,
    payload: Result<Json<QuotationInput>, JsonRejection>,
) -> CreatedResult<Transition<quotation::Model>> {
    let Json(input) = payload?;
    created(state.workflow.create_quotation(input).await?)
}
