//! Counter rows backing document numbers.
//!
//! Both counters use a single insert-or-increment statement followed by a
//! read-back. Callers run them inside the transaction that inserts the
//! numbered row, so the counter and the row commit together.

use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};

use super::entities::{document_sequence, job_sequence};

/// Increments the `(date, job_type)` counter and returns the new value.
/// The first call for a key returns 1.
pub async fn next_job_sequence<C: ConnectionTrait>(
    conn: &C,
    date: NaiveDate,
    job_type: &str,
) -> Result<i32, DbErr> {
    let row = job_sequence::ActiveModel {
        sequence_date: Set(date),
        job_type: Set(job_type.to_string()),
        last_sequence: Set(1),
    };

    job_sequence::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                job_sequence::Column::SequenceDate,
                job_sequence::Column::JobType,
            ])
            .value(
                job_sequence::Column::LastSequence,
                Expr::col(job_sequence::Column::LastSequence).add(1),
            )
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let current = job_sequence::Entity::find_by_id((date, job_type.to_string()))
        .one(conn)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!("job sequence {} / {}", date, job_type))
        })?;

    Ok(current.last_sequence)
}

/// Increments the counter for `scope`/`key` and returns the new value.
pub async fn next_document_sequence<C: ConnectionTrait>(
    conn: &C,
    scope: &str,
    key: &str,
) -> Result<i32, DbErr> {
    let row = document_sequence::ActiveModel {
        scope: Set(scope.to_string()),
        scope_key: Set(key.to_string()),
        last_value: Set(1),
    };

    document_sequence::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                document_sequence::Column::Scope,
                document_sequence::Column::ScopeKey,
            ])
            .value(
                document_sequence::Column::LastValue,
                Expr::col(document_sequence::Column::LastValue).add(1),
            )
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let current = document_sequence::Entity::find_by_id((scope.to_string(), key.to_string()))
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("document sequence {} / {}", scope, key)))?;

    Ok(current.last_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_job_sequence_counts_from_one() {
        let db = open_in_memory().await.unwrap();
        let day = date(2025, 5, 14);

        let mut values = Vec::new();
        for _ in 0..5 {
            values.push(next_job_sequence(&db, day, "ACCREDITED").await.unwrap());
        }
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_job_sequence_keys_are_independent() {
        let db = open_in_memory().await.unwrap();
        let day = date(2025, 5, 14);

        assert_eq!(next_job_sequence(&db, day, "ACCREDITED").await.unwrap(), 1);
        assert_eq!(next_job_sequence(&db, day, "NON-ACCREDITED").await.unwrap(), 1);
        assert_eq!(
            next_job_sequence(&db, date(2025, 5, 15), "ACCREDITED")
                .await
                .unwrap(),
            1
        );
        assert_eq!(next_job_sequence(&db, day, "ACCREDITED").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_document_sequence() {
        let db = open_in_memory().await.unwrap();

        assert_eq!(next_document_sequence(&db, "job", "2025-05").await.unwrap(), 1);
        assert_eq!(next_document_sequence(&db, "job", "2025-05").await.unwrap(), 2);
        assert_eq!(next_document_sequence(&db, "job", "2025-06").await.unwrap(), 1);
        assert_eq!(
            next_document_sequence(&db, "certificate", "2025-05")
                .await
                .unwrap(),
            1
        );
    }
}
