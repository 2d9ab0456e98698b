use sea_orm::{DbErr, RuntimeErr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Illegal status transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Store error: {0}")]
    Store(#[source] DbErr),
}

impl WorkflowError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Sorts driver errors into the workflow taxonomy by constraint kind.
impl From<DbErr> for WorkflowError {
    fn from(err: DbErr) -> Self {
        use sea_orm::sqlx::error::ErrorKind;

        let database_error = match &err {
            DbErr::Exec(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(e)))
            | DbErr::Query(RuntimeErr::SqlxError(sea_orm::sqlx::Error::Database(e))) => Some(e),
            _ => None,
        };

        let Some(database_error) = database_error else {
            return Self::Store(err);
        };
        let message = database_error.message().to_string();

        match database_error.kind() {
            ErrorKind::UniqueViolation => Self::Conflict(message),
            ErrorKind::ForeignKeyViolation => Self::NotFound {
                entity: "referenced record",
                id: message,
            },
            ErrorKind::NotNullViolation | ErrorKind::CheckViolation => Self::Validation(message),
            _ => Self::Store(err),
        }
    }
}
