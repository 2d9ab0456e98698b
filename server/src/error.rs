//! Server errors and their mapping onto HTTP responses.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use calitrack::logging::LoggingError;
use calitrack::{CalitrackError, WorkflowError};
use thiserror::Error;
use tracing::{error, warn};

use crate::api::ApiResponse;

/// Failures while bringing the server up.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Calitrack(#[from] CalitrackError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("Server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response carrying the `{success: false, message}` envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()>::err(self.message));
        (self.status, body).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        let status = match &err {
            WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
            WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
            WorkflowError::Conflict(_) | WorkflowError::IllegalTransition { .. } => {
                StatusCode::CONFLICT
            }
            WorkflowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %err, "request failed in the store");
            return Self::new(status, "Internal server error");
        }
        warn!(status = status.as_u16(), error = %err, "request rejected");
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
