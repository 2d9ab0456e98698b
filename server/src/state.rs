//! Shared server state.

use std::collections::HashMap;
use std::sync::Arc;

use calitrack::JobWorkflow;

/// State handed to every request handler.
pub struct ServerState {
    /// Workflow service over the injected connection pool.
    pub workflow: JobWorkflow,

    /// Bearer token -> caller name.
    tokens: HashMap<String, String>,
}

pub type AppState = Arc<ServerState>;

impl ServerState {
    pub fn new(workflow: JobWorkflow, tokens: HashMap<String, String>) -> Self {
        Self { workflow, tokens }
    }

    /// Resolves a bearer token to the caller it was issued to.
    pub fn caller_for(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }
}
