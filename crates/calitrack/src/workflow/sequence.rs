//! Sequence generation for job, job request and certificate numbers.
//!
//! Every function takes the transaction that will insert the numbered row,
//! so a rollback also rolls back the counter.

use chrono::NaiveDate;
use sea_orm::ConnectionTrait;
use tracing::debug;

use super::numbering::{self, JobType, MAX_JOB_SUFFIX};
use super::WorkflowError;
use crate::config::{CertificateNumberMode, JobNumberMode};
use crate::db::{request_repo, sequence_repo};

const JOB_SCOPE: &str = "job";
const CERTIFICATE_SCOPE: &str = "certificate";

/// Issues the next job number for `date`.
pub async fn next_job_number<C: ConnectionTrait>(
    conn: &C,
    mode: JobNumberMode,
    date: NaiveDate,
) -> Result<String, WorkflowError> {
    let suffix = match mode {
        JobNumberMode::Sequential => {
            let key = numbering::job_month_key(date);
            let value = sequence_repo::next_document_sequence(conn, JOB_SCOPE, &key).await?;
            if value > MAX_JOB_SUFFIX {
                return Err(WorkflowError::Conflict(format!(
                    "job numbers for {} are exhausted",
                    key
                )));
            }
            value
        }
        JobNumberMode::Random => numbering::random_job_suffix(),
    };
    debug!(suffix, ?mode, "issued job number suffix");
    Ok(numbering::job_number(date, suffix))
}

/// Atomic per-(date, job type) counter for job request numbers.
pub async fn next_job_request_sequence<C: ConnectionTrait>(
    conn: &C,
    date: NaiveDate,
    job_type: JobType,
) -> Result<i32, WorkflowError> {
    let sequence = sequence_repo::next_job_sequence(conn, date, job_type.as_str()).await?;
    debug!(%date, job_type = job_type.as_str(), sequence, "issued job request sequence");
    Ok(sequence)
}

/// Next certificate sequence for a job request.
pub async fn next_certificate_sequence<C: ConnectionTrait>(
    conn: &C,
    mode: CertificateNumberMode,
    job_request_id: i32,
    job_number: &str,
) -> Result<i32, WorkflowError> {
    let sequence = match mode {
        CertificateNumberMode::Counter => {
            sequence_repo::next_document_sequence(
                conn,
                CERTIFICATE_SCOPE,
                &job_request_id.to_string(),
            )
            .await?
        }
        CertificateNumberMode::Scan => {
            scan_certificate_sequence(conn, job_request_id, job_number).await?
        }
    };
    debug!(job_request_id, sequence, ?mode, "issued certificate sequence");
    Ok(sequence)
}

/// Reads the issued numbers and returns max + 1.
///
/// Two callers that scan before either inserts get the same value; the
/// unique index on certificate numbers rejects the second insert.
pub async fn scan_certificate_sequence<C: ConnectionTrait>(
    conn: &C,
    job_request_id: i32,
    job_number: &str,
) -> Result<i32, WorkflowError> {
    let existing =
        request_repo::certificate_numbers_with_prefix(conn, job_request_id, job_number).await?;
    Ok(numbering::next_scanned_sequence(job_number, &existing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_sequential_job_numbers() {
        let db = open_in_memory().await.unwrap();
        let day = date(2025, 5, 14);

        let first = next_job_number(&db, JobNumberMode::Sequential, day)
            .await
            .unwrap();
        let second = next_job_number(&db, JobNumberMode::Sequential, day)
            .await
            .unwrap();
        let next_month = next_job_number(&db, JobNumberMode::Sequential, date(2025, 6, 1))
            .await
            .unwrap();

        assert_eq!(first, "JB2025050001");
        assert_eq!(second, "JB2025050002");
        assert_eq!(next_month, "JB2025060001");
    }

    #[tokio::test]
    async fn test_random_job_number_shape() {
        let db = open_in_memory().await.unwrap();
        let number = next_job_number(&db, JobNumberMode::Random, date(2025, 5, 14))
            .await
            .unwrap();
        assert!(number.starts_with("JB202505"));
        assert_eq!(number.len(), 12);
    }

    #[tokio::test]
    async fn test_job_request_sequence() {
        let db = open_in_memory().await.unwrap();
        let day = date(2025, 5, 14);
        for expected in 1..=3 {
            let seq = next_job_request_sequence(&db, day, JobType::Accredited)
                .await
                .unwrap();
            assert_eq!(seq, expected);
        }
    }

    #[tokio::test]
    async fn test_certificate_counter_per_request() {
        let db = open_in_memory().await.unwrap();
        let mode = CertificateNumberMode::Counter;

        assert_eq!(next_certificate_sequence(&db, mode, 1, "ASC25/051401").await.unwrap(), 1);
        assert_eq!(next_certificate_sequence(&db, mode, 1, "ASC25/051401").await.unwrap(), 2);
        assert_eq!(next_certificate_sequence(&db, mode, 2, "ASC25/051402").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_certificate_scan_without_rows() {
        let db = open_in_memory().await.unwrap();
        let seq = next_certificate_sequence(&db, CertificateNumberMode::Scan, 1, "ASC25/051401")
            .await
            .unwrap();
        assert_eq!(seq, 1);
    }
}
