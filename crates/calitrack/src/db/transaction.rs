//! Transactional coordinator.
//!
//! Every multi-row write goes through [`run_transaction`]: the unit of work
//! receives a handle bound to one transaction, which is committed when the
//! work returns `Ok` and rolled back when it returns `Err`. A unit of work
//! dropped mid-flight (client disconnect, task abort) rolls back when the
//! transaction handle is dropped.

use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseTransaction, DbErr, TransactionError, TransactionTrait};
use tracing::{debug, warn};

/// Future returned by a unit of work borrowing the transaction for `'c`.
pub type TxFuture<'c, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>;

/// Runs `work` inside a single transaction on `db`.
///
/// `label` names the unit of work in logs. Errors from beginning or
/// committing the transaction are converted into `E`.
pub async fn run_transaction<C, F, T, E>(db: &C, label: &'static str, work: F) -> Result<T, E>
where
    C: TransactionTrait,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxFuture<'c, T, E> + Send,
    T: Send,
    E: From<DbErr> + std::error::Error + Send,
{
    debug!(transaction = label, "begin");
    match db.transaction::<F, T, E>(work).await {
        Ok(value) => {
            debug!(transaction = label, "committed");
            Ok(value)
        }
        Err(TransactionError::Connection(err)) => {
            warn!(transaction = label, error = %err, "transaction failed in the store");
            Err(E::from(err))
        }
        Err(TransactionError::Transaction(err)) => {
            debug!(transaction = label, error = %err, "rolled back");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::customer;
    use crate::db::open_in_memory;
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("db: {0}")]
        Db(#[from] DbErr),
        #[error("aborted")]
        Aborted,
    }

    fn new_customer(name: &str) -> customer::ActiveModel {
        customer::ActiveModel {
            name: Set(name.to_string()),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_commit_on_ok() {
        let db = open_in_memory().await.unwrap();

        let id = run_transaction(&db, "test", |txn| {
            Box::pin(async move {
                let model = new_customer("Acme").insert(txn).await?;
                Ok::<_, TestError>(model.id)
            })
        })
        .await
        .unwrap();

        let found = customer::Entity::find_by_id(id).one(&db).await.unwrap();
        assert_eq!(found.unwrap().name, "Acme");
    }

    #[tokio::test]
    async fn test_rollback_on_err() {
        let db = open_in_memory().await.unwrap();

        let result: Result<(), TestError> = run_transaction(&db, "test", |txn| {
            Box::pin(async move {
                new_customer("Acme").insert(txn).await?;
                new_customer("Globex").insert(txn).await?;
                Err(TestError::Aborted)
            })
        })
        .await;

        assert!(matches!(result, Err(TestError::Aborted)));
        let count = customer::Entity::find().count(&db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_store_error_rolls_back_earlier_writes() {
        let db = open_in_memory().await.unwrap();

        let result: Result<(), TestError> = run_transaction(&db, "test", |txn| {
            Box::pin(async move {
                new_customer("Acme").insert(txn).await?;
                // Missing NOT NULL column.
                customer::ActiveModel {
                    name: Set("Initech".to_string()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
                Ok(())
            })
        })
        .await;

        assert!(matches!(result, Err(TestError::Db(_))));
        let count = customer::Entity::find().count(&db).await.unwrap();
        assert_eq!(count, 0);
    }
}
