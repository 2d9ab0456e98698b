use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the authenticated caller, stored as a request extension.
#[derive(Debug, Clone)]
pub struct Caller(pub String);

/// Rejects requests without a known bearer token and records the caller
/// for handlers to extract via `Extension<Caller>`.
pub async fn require_caller(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        return ApiError::unauthorized("Missing bearer token").into_response();
    };
    let Some(caller) = state.caller_for(token).map(str::to_string) else {
        return ApiError::unauthorized("Unknown bearer token").into_response();
    };

    req.extensions_mut().insert(Caller(caller));
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
