use std::process::ExitCode;
use std::sync::Arc;

use calitrack::config::{apply_overrides, load_config, Config, DATABASE_URL_ENV};
use calitrack::{CalitrackError, JobWorkflow};
use calitrack_server::{router, ServerState, StartupError};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Environment variable naming the config file when no argument is given.
const CONFIG_ENV: &str = "CALITRACK_CONFIG";

/// Loads the config from the first CLI argument or `CALITRACK_CONFIG`,
/// falling back to defaults.
fn load() -> calitrack::Result<Config> {
    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(CONFIG_ENV).ok());

    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(apply_overrides(
            Config::default(),
            std::env::var(DATABASE_URL_ENV).ok(),
        )),
    }
}

async fn run(config: Config) -> Result<(), StartupError> {
    let db = calitrack::init_database(&config.database)
        .await
        .map_err(CalitrackError::from)?;
    let workflow = JobWorkflow::from_config(db, &config);

    if config.server.tokens.is_empty() {
        warn!("No bearer tokens configured; every request will be rejected");
    }
    let state = Arc::new(ServerState::new(workflow, config.server.tokens.clone()));

    let listener = TcpListener::bind(&config.server.bind).await?;
    info!("Calitrack server listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("calitrack-server: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = calitrack::logging::init(&config.logging) {
        eprintln!("calitrack-server: {}", StartupError::from(e));
        return ExitCode::FAILURE;
    }

    info!("Starting calitrack server v{}", env!("CARGO_PKG_VERSION"));

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
