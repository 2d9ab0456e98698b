use std::net::SocketAddr;
use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Environment variable that replaces `database.url` after loading.
pub const DATABASE_URL_ENV: &str = "CALITRACK_DATABASE_URL";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = load_config_from_str(&content)?;
    Ok(apply_overrides(config, std::env::var(DATABASE_URL_ENV).ok()))
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Applies environment-level overrides on top of a loaded config.
pub fn apply_overrides(mut config: Config, database_url: Option<String>) -> Config {
    if let Some(url) = database_url.filter(|u| !u.trim().is_empty()) {
        config.database.url = url;
    }
    config
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let db = &config.database;
    if db.max_connections == 0 {
        return Err(ConfigError::Validation {
            message: "database.max_connections must be at least 1".to_string(),
        });
    }
    if db.min_connections > db.max_connections {
        return Err(ConfigError::Validation {
            message: format!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                db.min_connections, db.max_connections
            ),
        });
    }

    if config.server.bind.parse::<SocketAddr>().is_err() {
        return Err(ConfigError::Validation {
            message: format!("Invalid server.bind address: {}", config.server.bind),
        });
    }

    if config.server.tokens.keys().any(|token| token.trim().is_empty()) {
        return Err(ConfigError::Validation {
            message: "server.tokens contains an empty token".to_string(),
        });
    }

    Ok(())
}
