//! Database error types.

use std::path::PathBuf;

use sea_orm::DbErr;
use thiserror::Error;

/// Errors from opening and migrating the database.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not be created or the first connection failed.
    #[error("Failed to connect to '{url}': {source}")]
    Connect {
        url: String,
        #[source]
        source: DbErr,
    },

    /// A migration failed to apply.
    #[error("Migration failed: {0}")]
    Migration(#[source] DbErr),

    /// IO error when creating the directory of a file-backed database.
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
