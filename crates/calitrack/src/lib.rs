pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod workflow;

pub use config::{load_config, Config};
pub use db::{init_database, DatabaseError};
pub use error::{CalitrackError, ConfigError, Result};
pub use workflow::{JobStatus, JobWorkflow, WorkflowError, WorkflowSettings};
