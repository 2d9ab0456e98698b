//! REST API for the job workflow.
//!
//! Routes are organized by domain:
//! - `customers`: Customer records
//! - `jobs`: Intake, inspection, status changes, delivery and read views
//! - `quotations`: Quotations
//! - `approvals`: Approvals and readiness for delivery
//! - `job_requests`: Job request numbering and certificates

pub mod approvals;
pub mod auth;
pub mod customers;
pub mod job_requests;
pub mod jobs;
pub mod quotations;

use axum::http::StatusCode;
use axum::{middleware, Json, Router};
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

pub use auth::Caller;

/// Response envelope for every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;
pub type CreatedResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub(crate) fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

pub(crate) fn created<T>(data: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(data))))
}

/// Builds the API router. Every route requires a known bearer token.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(customers::routes())
        .merge(jobs::routes())
        .merge(quotations::routes())
        .merge(approvals::routes())
        .merge(job_requests::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_caller,
        ))
        .with_state(state)
}
