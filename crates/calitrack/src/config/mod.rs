pub mod loader;
pub mod schema;

pub use loader::{apply_overrides, load_config, load_config_from_str, DATABASE_URL_ENV};
pub use schema::{
    CertificateConfig, CertificateNumberMode, Config, DatabaseConfig, JobNumberMode, LogFormat,
    LoggingConfig, NumberingConfig, ServerConfig, TransitionPolicy, WorkflowConfig,
};
