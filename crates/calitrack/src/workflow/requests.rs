//! Job requests and calibration certificates.

use sea_orm::ConnectionTrait;
use tracing::{info, info_span, Instrument};

use super::inputs::{CertificateInput, JobRequestInput, ValidCertificate, ValidJobRequest};
use super::machine::{today, JobWorkflow};
use super::numbering;
use super::sequence;
use super::views::JobRequestView;
use super::WorkflowError;
use crate::config::CertificateNumberMode;
use crate::db::entities::certificate;
use crate::db::request_repo::{self, NewCertificate, NewJobRequest};
use crate::db::{customer_repo, run_transaction};

impl JobWorkflow {
    /// Issues the next job request number for `(date, job type)` and
    /// inserts the request in the same transaction.
    pub async fn generate_job_request(
        &self,
        input: JobRequestInput,
        caller: &str,
    ) -> Result<JobRequestView, WorkflowError> {
        let valid = input.validate(today())?;
        let created_by = caller.to_string();

        let view = run_transaction(self.db(), "generate_job_request", move |txn| {
            Box::pin(generate_job_request_tx(txn, valid, created_by))
        })
        .instrument(info_span!("generate_job_request"))
        .await?;

        info!(
            job_request_id = view.id,
            job_number = %view.job_number,
            "job request generated"
        );
        Ok(view)
    }

    /// Numbers and inserts a certificate for a job request. The due date
    /// defaults to the calibration date plus the configured interval.
    pub async fn issue_certificate(
        &self,
        input: CertificateInput,
    ) -> Result<certificate::Model, WorkflowError> {
        let valid = input.validate()?;
        let mode = self.settings().certificate_numbers;
        let interval = self.settings().calibration_interval_months;
        let job_request_id = valid.job_request_id;

        let certificate = run_transaction(self.db(), "issue_certificate", move |txn| {
            Box::pin(issue_certificate_tx(txn, mode, interval, valid))
        })
        .instrument(info_span!("issue_certificate", job_request_id))
        .await?;

        info!(
            job_request_id,
            certificate_number = %certificate.certificate_number,
            "certificate issued"
        );
        Ok(certificate)
    }

    pub async fn list_certificates(
        &self,
        job_request_id: i32,
    ) -> Result<Vec<certificate::Model>, WorkflowError> {
        if request_repo::find_job_request(self.db(), job_request_id)
            .await?
            .is_none()
        {
            return Err(WorkflowError::not_found("job request", job_request_id));
        }
        Ok(request_repo::list_certificates(self.db(), job_request_id).await?)
    }
}

async fn generate_job_request_tx<C: ConnectionTrait>(
    conn: &C,
    input: ValidJobRequest,
    created_by: String,
) -> Result<JobRequestView, WorkflowError> {
    let customer = customer_repo::find(conn, input.customer_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found("customer", input.customer_id))?;

    let sequence = sequence::next_job_request_sequence(conn, input.date, input.job_type).await?;
    let job_number = numbering::job_request_number(input.date, input.job_type, sequence);

    let request = request_repo::insert_job_request(
        conn,
        NewJobRequest {
            job_number,
            date: input.date,
            job_type: input.job_type.as_str().to_string(),
            customer_id: input.customer_id,
            created_by,
            notifications_enabled: input.notifications_enabled,
        },
    )
    .await?;

    Ok(JobRequestView::new(request, Some(customer)))
}

async fn issue_certificate_tx<C: ConnectionTrait>(
    conn: &C,
    mode: CertificateNumberMode,
    interval_months: u32,
    input: ValidCertificate,
) -> Result<certificate::Model, WorkflowError> {
    let request = request_repo::find_job_request(conn, input.job_request_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found("job request", input.job_request_id))?;

    let calibration_due_date = match input.calibration_due_date {
        Some(due) => due,
        None => numbering::add_months(input.date_of_calibration, interval_months).ok_or_else(
            || WorkflowError::validation("calibration due date is out of range"),
        )?,
    };

    let sequence =
        sequence::next_certificate_sequence(conn, mode, request.id, &request.job_number).await?;
    let certificate_number = numbering::certificate_number(&request.job_number, sequence);

    let certificate = request_repo::insert_certificate(
        conn,
        NewCertificate {
            job_request_id: request.id,
            certificate_number,
            date_of_calibration: input.date_of_calibration,
            calibration_due_date,
            equipment_name: input.equipment_name,
            manufacturer: input.manufacturer,
            model: input.model,
            serial_number: input.serial_number,
            capacity: input.capacity,
            resolution: input.resolution,
            location: input.location,
        },
    )
    .await?;

    Ok(certificate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::open_in_memory;
    use crate::workflow::inputs::CustomerInput;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup() -> (JobWorkflow, i32) {
        let db = open_in_memory().await.unwrap();
        let workflow = JobWorkflow::from_config(db, &Config::default());
        let customer = workflow
            .create_customer(CustomerInput {
                name: Some("Acme".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        (workflow, customer.id)
    }

    fn request_input(customer_id: i32, job_type: &str) -> JobRequestInput {
        JobRequestInput {
            job_type: Some(job_type.to_string()),
            date: Some(date(2025, 5, 14)),
            customer_id: Some(customer_id),
            notifications_enabled: None,
        }
    }

    #[tokio::test]
    async fn test_generate_job_request_numbers() {
        let (workflow, customer_id) = setup().await;

        let first = workflow
            .generate_job_request(request_input(customer_id, "accredited"), "frontdesk")
            .await
            .unwrap();
        let second = workflow
            .generate_job_request(request_input(customer_id, "ACCREDITED"), "frontdesk")
            .await
            .unwrap();
        let other = workflow
            .generate_job_request(request_input(customer_id, "NON-ACCREDITED"), "frontdesk")
            .await
            .unwrap();

        assert_eq!(first.job_number, "ASC25/A051401");
        assert_eq!(second.job_number, "ASC25/A051402");
        assert_eq!(other.job_number, "ASC25/051401");
        assert_eq!(first.customer_name.as_deref(), Some("Acme"));
        assert_eq!(first.created_by, "frontdesk");
        assert!(first.notifications_enabled);
    }

    #[tokio::test]
    async fn test_generate_job_request_unknown_customer() {
        let (workflow, _) = setup().await;
        let result = workflow
            .generate_job_request(request_input(404, "accredited"), "frontdesk")
            .await;
        assert!(matches!(result, Err(WorkflowError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_certificate_due_date_default() {
        let (workflow, customer_id) = setup().await;
        let request = workflow
            .generate_job_request(request_input(customer_id, "accredited"), "frontdesk")
            .await
            .unwrap();

        let certificate = workflow
            .issue_certificate(CertificateInput {
                job_request_id: Some(request.id),
                date_of_calibration: Some(date(2025, 5, 14)),
                equipment_name: Some("Platform scale".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(certificate.certificate_number, "ASC25/A051401-01");
        assert_eq!(certificate.calibration_due_date, date(2026, 5, 14));
    }

    #[tokio::test]
    async fn test_certificates_for_missing_request() {
        let (workflow, _) = setup().await;
        assert!(matches!(
            workflow.list_certificates(9).await,
            Err(WorkflowError::NotFound { .. })
        ));
    }
}
