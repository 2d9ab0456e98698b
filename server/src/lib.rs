//! REST boundary of the calitrack job workflow.

pub mod api;
pub mod error;
pub mod state;

pub use api::{router, ApiResponse};
pub use error::{ApiError, StartupError};
pub use state::{AppState, ServerState};
