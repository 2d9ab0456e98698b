//! The job workflow service.
//!
//! Each pipeline stage is one unit of work run through
//! [`run_transaction`]: the job row is read and its transition checked, the
//! stage's child rows are written, and the status is moved with a
//! compare-and-set on the status that was read. Any failure rolls back every
//! write of the stage.

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde::Serialize;
use tracing::{info, info_span, Instrument};

use super::inputs::{
    ApprovalInput, CreateJobInput, CustomerInput, DeliveryInput, InspectionInput, QuotationInput,
    ReadyInput, StatusChangeInput, ValidApproval, ValidCustomer, ValidDelivery, ValidInspection,
    ValidJob, ValidQuotation,
};
use super::sequence;
use super::status::{check_transition, JobStatus};
use super::WorkflowError;
use crate::config::{CertificateNumberMode, Config, JobNumberMode, TransitionPolicy};
use crate::db::entities::{approval, customer, delivery, inspection, job, quotation, spare_part};
use crate::db::job_repo::NewJob;
use crate::db::stage_repo::{DeliveryRecord, NewApproval, NewInspection, NewQuotation, NewSparePart};
use crate::db::{customer_repo, job_repo, run_transaction, stage_repo};

/// Knobs of the workflow taken from [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct WorkflowSettings {
    pub transition_policy: TransitionPolicy,
    pub job_numbers: JobNumberMode,
    pub certificate_numbers: CertificateNumberMode,
    pub calibration_interval_months: u32,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl WorkflowSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            transition_policy: config.workflow.transition_policy,
            job_numbers: config.numbering.job_numbers,
            certificate_numbers: config.numbering.certificate_numbers,
            calibration_interval_months: config.certificates.calibration_interval_months,
        }
    }
}

/// Result of a job intake.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedJob {
    pub job_id: i32,
    pub job_number: String,
    pub status: JobStatus,
}

/// A stage that moved a job, with the record it wrote.
#[derive(Debug, Clone, Serialize)]
pub struct Transition<T> {
    pub job_id: i32,
    pub previous_status: JobStatus,
    pub status: JobStatus,
    pub record: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectionRecord {
    #[serde(flatten)]
    pub inspection: inspection::Model,
    pub spare_parts: Vec<spare_part::Model>,
}

/// Workflow operations over an injected connection pool.
#[derive(Clone)]
pub struct JobWorkflow {
    db: DatabaseConnection,
    settings: WorkflowSettings,
}

impl JobWorkflow {
    pub fn new(db: DatabaseConnection, settings: WorkflowSettings) -> Self {
        Self { db, settings }
    }

    pub fn from_config(db: DatabaseConnection, config: &Config) -> Self {
        Self::new(db, WorkflowSettings::from_config(config))
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub async fn create_customer(
        &self,
        input: CustomerInput,
    ) -> Result<customer::Model, WorkflowError> {
        let ValidCustomer {
            name,
            email,
            phone,
            address,
        } = input.validate()?;
        let customer = customer_repo::insert(
            &self.db,
            customer_repo::NewCustomer {
                name,
                email,
                phone,
                address,
            },
        )
        .await?;
        info!(customer_id = customer.id, "customer created");
        Ok(customer)
    }

    pub async fn get_customer(&self, id: i32) -> Result<customer::Model, WorkflowError> {
        customer_repo::find(&self.db, id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("customer", id))
    }

    pub async fn list_customers(&self) -> Result<Vec<customer::Model>, WorkflowError> {
        Ok(customer_repo::list(&self.db).await?)
    }

    /// Takes a job in with status `pending_inspection` and a fresh job number.
    pub async fn create_job(
        &self,
        input: CreateJobInput,
        caller: &str,
    ) -> Result<CreatedJob, WorkflowError> {
        let valid = input.validate(caller)?;
        let mode = self.settings.job_numbers;
        let intake_date = today();

        let created = run_transaction(&self.db, "create_job", move |txn| {
            Box::pin(create_job_tx(txn, mode, intake_date, valid))
        })
        .instrument(info_span!("create_job"))
        .await?;

        info!(
            job_id = created.job_id,
            job_number = %created.job_number,
            "job created"
        );
        Ok(created)
    }

    /// `pending_inspection → pending_quotation`, writing the inspection and
    /// its spare parts.
    pub async fn submit_inspection(
        &self,
        input: InspectionInput,
    ) -> Result<Transition<InspectionRecord>, WorkflowError> {
        let valid = input.validate()?;
        let policy = self.settings.transition_policy;
        let job_id = valid.job_id;

        let transition = run_transaction(&self.db, "submit_inspection", move |txn| {
            Box::pin(submit_inspection_tx(txn, policy, valid))
        })
        .instrument(info_span!("submit_inspection", job_id))
        .await?;

        log_transition(&transition);
        Ok(transition)
    }

    /// `pending_quotation → pending_approval`, writing a `sent` quotation.
    pub async fn create_quotation(
        &self,
        input: QuotationInput,
    ) -> Result<Transition<quotation::Model>, WorkflowError> {
        let valid = input.validate()?;
        let policy = self.settings.transition_policy;
        let job_id = valid.job_id;

        let transition = run_transaction(&self.db, "create_quotation", move |txn| {
            Box::pin(create_quotation_tx(txn, policy, valid))
        })
        .instrument(info_span!("create_quotation", job_id))
        .await?;

        log_transition(&transition);
        Ok(transition)
    }

    /// `pending_approval → approved`. Also stamps the LPO number on the job
    /// and marks its quotations approved.
    pub async fn create_approval(
        &self,
        input: ApprovalInput,
        caller: &str,
    ) -> Result<Transition<approval::Model>, WorkflowError> {
        let valid = input.validate()?;
        let policy = self.settings.transition_policy;
        let job_id = valid.job_id;
        let prepared_by = caller.to_string();

        let transition = run_transaction(&self.db, "create_approval", move |txn| {
            Box::pin(create_approval_tx(txn, policy, valid, prepared_by))
        })
        .instrument(info_span!("create_approval", job_id))
        .await?;

        log_transition(&transition);
        Ok(transition)
    }

    /// `approved → ready_for_delivery` for the job behind an approval,
    /// ensuring its delivery row exists.
    pub async fn mark_ready(
        &self,
        approval_id: i32,
        input: ReadyInput,
        caller: &str,
    ) -> Result<Transition<delivery::Model>, WorkflowError> {
        let policy = self.settings.transition_policy;
        let delivery_date = input.delivery_date.unwrap_or_else(today);
        let prepared_by = caller.to_string();

        let transition = run_transaction(&self.db, "mark_ready", move |txn| {
            Box::pin(mark_ready_tx(
                txn,
                policy,
                approval_id,
                delivery_date,
                prepared_by,
            ))
        })
        .instrument(info_span!("mark_ready", approval_id))
        .await?;

        log_transition(&transition);
        Ok(transition)
    }

    /// Upserts the job's delivery and invoice details, optionally moving
    /// the job to the requested status (normally `completed`).
    pub async fn record_delivery(
        &self,
        job_id: i32,
        input: DeliveryInput,
    ) -> Result<Transition<delivery::Model>, WorkflowError> {
        let valid = input.validate()?;
        let policy = self.settings.transition_policy;

        let transition = run_transaction(&self.db, "record_delivery", move |txn| {
            Box::pin(record_delivery_tx(txn, policy, job_id, valid))
        })
        .instrument(info_span!("record_delivery", job_id))
        .await?;

        log_transition(&transition);
        Ok(transition)
    }

    /// Generic status change, checked against the transition table.
    pub async fn change_status(
        &self,
        job_id: i32,
        input: StatusChangeInput,
    ) -> Result<Transition<job::Model>, WorkflowError> {
        let to = input.validate()?;
        let policy = self.settings.transition_policy;

        let transition = run_transaction(&self.db, "change_status", move |txn| {
            Box::pin(change_status_tx(txn, policy, job_id, to))
        })
        .instrument(info_span!("change_status", job_id, to = %to))
        .await?;

        log_transition(&transition);
        Ok(transition)
    }
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn log_transition<T>(transition: &Transition<T>) {
    if transition.previous_status != transition.status {
        info!(
            job_id = transition.job_id,
            from = %transition.previous_status,
            to = %transition.status,
            "job status changed"
        );
    }
}

/// Reads a job and its parsed status.
async fn load_job<C: ConnectionTrait>(
    conn: &C,
    job_id: i32,
) -> Result<(job::Model, JobStatus), WorkflowError> {
    let job = job_repo::find(conn, job_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found("job", job_id))?;
    let status = job.status.parse::<JobStatus>()?;
    Ok((job, status))
}

/// Loads the job and checks that it may move to `to`. Returns the status
/// the job holds now.
async fn begin_transition<C: ConnectionTrait>(
    conn: &C,
    policy: TransitionPolicy,
    job_id: i32,
    to: JobStatus,
) -> Result<JobStatus, WorkflowError> {
    let (_, from) = load_job(conn, job_id).await?;
    check_transition(policy, from, to)?;
    Ok(from)
}

/// Moves the job from `from` to `to`. Fails if the job no longer holds
/// `from`.
async fn write_status<C: ConnectionTrait>(
    conn: &C,
    job_id: i32,
    from: JobStatus,
    to: JobStatus,
) -> Result<(), WorkflowError> {
    let rows = job_repo::update_status(conn, job_id, to.as_str(), Some(from.as_str())).await?;
    if rows == 0 {
        return Err(WorkflowError::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    Ok(())
}

async fn create_job_tx<C: ConnectionTrait>(
    conn: &C,
    mode: JobNumberMode,
    intake_date: NaiveDate,
    job: ValidJob,
) -> Result<CreatedJob, WorkflowError> {
    if customer_repo::find(conn, job.customer_id).await?.is_none() {
        return Err(WorkflowError::not_found("customer", job.customer_id));
    }

    let job_number = sequence::next_job_number(conn, mode, intake_date).await?;
    let created = job_repo::insert(
        conn,
        NewJob {
            job_number,
            customer_id: job.customer_id,
            taken_by: job.taken_by,
            scale_make: job.scale_make,
            scale_model: job.scale_model,
            scale_serial: job.scale_serial,
            remark: job.remark,
            lpo_number: job.lpo_number,
        },
    )
    .await?;

    Ok(CreatedJob {
        job_id: created.id,
        job_number: created.job_number,
        status: JobStatus::PendingInspection,
    })
}

async fn submit_inspection_tx<C: ConnectionTrait>(
    conn: &C,
    policy: TransitionPolicy,
    input: ValidInspection,
) -> Result<Transition<InspectionRecord>, WorkflowError> {
    let to = JobStatus::PendingQuotation;
    let from = begin_transition(conn, policy, input.job_id, to).await?;

    let inspection = stage_repo::insert_inspection(
        conn,
        NewInspection {
            job_id: input.job_id,
            problems_found: input.problems_found,
            inspected_by: input.inspected_by,
            inspection_date: input.inspection_date,
            total_cost: input.total_cost,
            notes: input.notes,
        },
    )
    .await?;

    let mut spare_parts = Vec::with_capacity(input.spare_parts.len());
    for part in input.spare_parts {
        let part = stage_repo::insert_spare_part(
            conn,
            NewSparePart {
                inspection_id: inspection.id,
                part_name: part.part_name,
                quantity: part.quantity,
                unit_price: part.unit_price,
            },
        )
        .await?;
        spare_parts.push(part);
    }

    write_status(conn, input.job_id, from, to).await?;

    Ok(Transition {
        job_id: input.job_id,
        previous_status: from,
        status: to,
        record: InspectionRecord {
            inspection,
            spare_parts,
        },
    })
}

async fn create_quotation_tx<C: ConnectionTrait>(
    conn: &C,
    policy: TransitionPolicy,
    input: ValidQuotation,
) -> Result<Transition<quotation::Model>, WorkflowError> {
    if stage_repo::quotation_number_exists(conn, &input.quotation_number).await? {
        return Err(WorkflowError::Conflict(format!(
            "quotation number {} already exists",
            input.quotation_number
        )));
    }

    let to = JobStatus::PendingApproval;
    let from = begin_transition(conn, policy, input.job_id, to).await?;

    let quotation = stage_repo::insert_quotation(
        conn,
        NewQuotation {
            job_id: input.job_id,
            quotation_number: input.quotation_number,
            quotation_date: input.quotation_date,
            amount: input.amount,
        },
    )
    .await?;

    write_status(conn, input.job_id, from, to).await?;

    Ok(Transition {
        job_id: input.job_id,
        previous_status: from,
        status: to,
        record: quotation,
    })
}

async fn create_approval_tx<C: ConnectionTrait>(
    conn: &C,
    policy: TransitionPolicy,
    input: ValidApproval,
    prepared_by: String,
) -> Result<Transition<approval::Model>, WorkflowError> {
    let to = JobStatus::Approved;
    let from = begin_transition(conn, policy, input.job_id, to).await?;

    let approval = stage_repo::insert_approval(
        conn,
        NewApproval {
            job_id: input.job_id,
            lpo_number: input.lpo_number,
            approval_date: input.approval_date,
            prepared_by,
            notes: input.notes,
        },
    )
    .await?;
    job_repo::set_lpo_number(conn, input.job_id, &approval.lpo_number).await?;
    stage_repo::approve_quotations(conn, input.job_id).await?;

    write_status(conn, input.job_id, from, to).await?;

    Ok(Transition {
        job_id: input.job_id,
        previous_status: from,
        status: to,
        record: approval,
    })
}

async fn mark_ready_tx<C: ConnectionTrait>(
    conn: &C,
    policy: TransitionPolicy,
    approval_id: i32,
    delivery_date: NaiveDate,
    prepared_by: String,
) -> Result<Transition<delivery::Model>, WorkflowError> {
    let approval = stage_repo::find_approval(conn, approval_id)
        .await?
        .ok_or_else(|| WorkflowError::not_found("approval", approval_id))?;

    let to = JobStatus::ReadyForDelivery;
    let from = begin_transition(conn, policy, approval.job_id, to).await?;

    let delivery =
        stage_repo::ensure_delivery_stub(conn, approval.job_id, &prepared_by, delivery_date)
            .await?;

    write_status(conn, approval.job_id, from, to).await?;

    Ok(Transition {
        job_id: approval.job_id,
        previous_status: from,
        status: to,
        record: delivery,
    })
}

async fn record_delivery_tx<C: ConnectionTrait>(
    conn: &C,
    policy: TransitionPolicy,
    job_id: i32,
    input: ValidDelivery,
) -> Result<Transition<delivery::Model>, WorkflowError> {
    let (_, from) = load_job(conn, job_id).await?;

    if policy == TransitionPolicy::Strict
        && !matches!(from, JobStatus::ReadyForDelivery | JobStatus::Completed)
    {
        return Err(WorkflowError::IllegalTransition {
            from: from.to_string(),
            to: input.status.unwrap_or(from).to_string(),
        });
    }
    let to = match input.status {
        Some(to) if to != from => {
            check_transition(policy, from, to)?;
            to
        }
        _ => from,
    };

    let delivery = stage_repo::record_delivery(
        conn,
        job_id,
        DeliveryRecord {
            invoice_number: Some(input.invoice_number),
            invoice_amount: input.invoice_amount,
            invoice_date: input.invoice_date,
            delivered_by: input.delivered_by,
            delivery_date: input.delivery_date,
        },
    )
    .await?;

    if to != from {
        write_status(conn, job_id, from, to).await?;
    }

    Ok(Transition {
        job_id,
        previous_status: from,
        status: to,
        record: delivery,
    })
}

async fn change_status_tx<C: ConnectionTrait>(
    conn: &C,
    policy: TransitionPolicy,
    job_id: i32,
    to: JobStatus,
) -> Result<Transition<job::Model>, WorkflowError> {
    let from = begin_transition(conn, policy, job_id, to).await?;
    write_status(conn, job_id, from, to).await?;
    let (job, _) = load_job(conn, job_id).await?;

    Ok(Transition {
        job_id,
        previous_status: from,
        status: to,
        record: job,
    })
}
