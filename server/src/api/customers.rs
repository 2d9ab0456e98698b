//! Customer endpoints.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use calitrack::db::entities::customer;
use calitrack::workflow::inputs::CustomerInput;

use super::{created, ok, ApiResult, CreatedResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", post(create_customer).get(list_customers))
        .route("/customers/{id}", get(get_customer))
}

/// Create a customer.
async fn create_customer(
    State(state): State<AppState>,
    payload: Result<Json<CustomerInput>, JsonRejection>,
) -> CreatedResult<customer::Model> {
    let Json(input) = payload?;
    created(state.workflow.create_customer(input).await?)
}

/// List customers by name.
async fn list_customers(State(state): State<AppState>) -> ApiResult<Vec<customer::Model>> {
    ok(state.workflow.list_customers().await?)
}

async fn get_customer(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<customer::Model> {
    let Path(id) = id?;
    ok(state.workflow.get_customer(id).await?)
}
