//! Read views for list screens and the dashboard.
//!
//! Jobs are flattened with the latest row of each stage table. Stage rows
//! are batch-loaded with one query per table for the whole page of jobs.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::machine::JobWorkflow;
use super::status::JobStatus;
use super::WorkflowError;
use crate::db::entities::{
    approval, customer, delivery, inspection, job, job_request, quotation, spare_part,
};
use crate::db::{job_repo, request_repo, stage_repo};

/// One job with its customer and stage details.
#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: i32,
    pub job_number: String,
    pub customer_id: i32,
    pub customer_name: Option<String>,
    pub taken_by: String,
    pub status: String,
    pub scale_make: Option<String>,
    pub scale_model: Option<String>,
    pub scale_serial: Option<String>,
    pub remark: Option<String>,
    pub lpo_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub inspection_id: Option<i32>,
    pub problems_found: Option<String>,
    pub inspected_by: Option<String>,
    pub inspection_date: Option<NaiveDate>,
    pub total_cost: Option<f64>,
    pub inspection_notes: Option<String>,

    pub quotation_id: Option<i32>,
    pub quotation_number: Option<String>,
    pub quotation_date: Option<NaiveDate>,
    pub quotation_amount: Option<f64>,
    pub quotation_status: Option<String>,

    pub approval_id: Option<i32>,
    pub approval_date: Option<NaiveDate>,
    pub prepared_by: Option<String>,
    pub approval_notes: Option<String>,

    pub invoice_number: Option<String>,
    pub invoice_amount: Option<f64>,
    pub invoice_date: Option<NaiveDate>,
    pub delivered_by: Option<String>,
    pub delivery_date: Option<NaiveDate>,

    pub spare_parts: Vec<spare_part::Model>,
}

impl JobView {
    fn assemble(
        job: job::Model,
        customer: Option<customer::Model>,
        inspection: Option<&inspection::Model>,
        quotation: Option<&quotation::Model>,
        approval: Option<&approval::Model>,
        delivery: Option<&delivery::Model>,
        spare_parts: Vec<spare_part::Model>,
    ) -> Self {
        Self {
            id: job.id,
            job_number: job.job_number,
            customer_id: job.customer_id,
            customer_name: customer.map(|c| c.name),
            taken_by: job.taken_by,
            status: job.status,
            scale_make: job.scale_make,
            scale_model: job.scale_model,
            scale_serial: job.scale_serial,
            remark: job.remark,
            lpo_number: job.lpo_number,
            created_at: job.created_at,
            updated_at: job.updated_at,

            inspection_id: inspection.map(|i| i.id),
            problems_found: inspection.map(|i| i.problems_found.clone()),
            inspected_by: inspection.map(|i| i.inspected_by.clone()),
            inspection_date: inspection.map(|i| i.inspection_date),
            total_cost: inspection.and_then(|i| i.total_cost),
            inspection_notes: inspection.and_then(|i| i.notes.clone()),

            quotation_id: quotation.map(|q| q.id),
            quotation_number: quotation.map(|q| q.quotation_number.clone()),
            quotation_date: quotation.map(|q| q.quotation_date),
            quotation_amount: quotation.map(|q| q.amount),
            quotation_status: quotation.map(|q| q.status.clone()),

            approval_id: approval.map(|a| a.id),
            approval_date: approval.map(|a| a.approval_date),
            prepared_by: approval.map(|a| a.prepared_by.clone()),
            approval_notes: approval.and_then(|a| a.notes.clone()),

            invoice_number: delivery.and_then(|d| d.invoice_number.clone()),
            invoice_amount: delivery.and_then(|d| d.invoice_amount),
            invoice_date: delivery.and_then(|d| d.invoice_date),
            delivered_by: delivery.and_then(|d| d.delivered_by.clone()),
            delivery_date: delivery.and_then(|d| d.delivery_date),

            spare_parts,
        }
    }
}

/// Job counts for the dashboard. Every status is present, zero if unused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub pending_inspection: i64,
    pub pending_quotation: i64,
    pub pending_approval: i64,
    pub approved: i64,
    pub ready_for_delivery: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub total: i64,
}

impl DashboardSummary {
    fn slot(&mut self, status: JobStatus) -> &mut i64 {
        match status {
            JobStatus::PendingInspection => &mut self.pending_inspection,
            JobStatus::PendingQuotation => &mut self.pending_quotation,
            JobStatus::PendingApproval => &mut self.pending_approval,
            JobStatus::Approved => &mut self.approved,
            JobStatus::ReadyForDelivery => &mut self.ready_for_delivery,
            JobStatus::Completed => &mut self.completed,
            JobStatus::Cancelled => &mut self.cancelled,
        }
    }

    fn from_counts(counts: Vec<(String, i64)>) -> Self {
        let mut summary = Self::default();
        for (status, count) in counts {
            summary.total += count;
            if let Ok(status) = status.parse::<JobStatus>() {
                *summary.slot(status) += count;
            }
        }
        summary
    }
}

/// A job request joined with its customer's name.
#[derive(Debug, Clone, Serialize)]
pub struct JobRequestView {
    pub id: i32,
    pub job_number: String,
    pub date: NaiveDate,
    pub job_type: String,
    pub customer_id: i32,
    pub customer_name: Option<String>,
    pub created_by: String,
    pub notifications_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl JobRequestView {
    pub(crate) fn new(request: job_request::Model, customer: Option<customer::Model>) -> Self {
        Self {
            id: request.id,
            job_number: request.job_number,
            date: request.date,
            job_type: request.job_type,
            customer_id: request.customer_id,
            customer_name: customer.map(|c| c.name),
            created_by: request.created_by,
            notifications_enabled: request.notifications_enabled,
            created_at: request.created_at,
        }
    }
}

/// Keeps the row with the highest id per key.
fn latest_by<T, K, F>(rows: &[T], key: F, id: fn(&T) -> i32) -> HashMap<K, &T>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut latest: HashMap<K, &T> = HashMap::new();
    for row in rows {
        let slot = latest.entry(key(row)).or_insert(row);
        if id(row) > id(*slot) {
            *slot = row;
        }
    }
    latest
}

impl JobWorkflow {
    /// Jobs newest first, optionally restricted to one status.
    pub async fn list_jobs(
        &self,
        status: Option<JobStatus>,
    ) -> Result<Vec<JobView>, WorkflowError> {
        let rows =
            job_repo::list_with_customers(self.db(), status.map(JobStatus::as_str)).await?;
        self.assemble_views(rows).await
    }

    pub async fn get_job(&self, job_id: i32) -> Result<JobView, WorkflowError> {
        let row = job_repo::find_with_customer(self.db(), job_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("job", job_id))?;
        let mut views = self.assemble_views(vec![row]).await?;
        views
            .pop()
            .ok_or_else(|| WorkflowError::not_found("job", job_id))
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary, WorkflowError> {
        let counts = job_repo::count_by_status(self.db()).await?;
        Ok(DashboardSummary::from_counts(counts))
    }

    pub async fn get_job_request(&self, id: i32) -> Result<JobRequestView, WorkflowError> {
        let (request, customer) = request_repo::find_job_request_with_customer(self.db(), id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("job request", id))?;
        Ok(JobRequestView::new(request, customer))
    }

    async fn assemble_views(
        &self,
        rows: Vec<(job::Model, Option<customer::Model>)>,
    ) -> Result<Vec<JobView>, WorkflowError> {
        let db = self.db();
        let job_ids: Vec<i32> = rows.iter().map(|(job, _)| job.id).collect();

        let inspections = stage_repo::inspections_for_jobs(db, &job_ids).await?;
        let quotations = stage_repo::quotations_for_jobs(db, &job_ids).await?;
        let approvals = stage_repo::approvals_for_jobs(db, &job_ids).await?;
        let deliveries = stage_repo::deliveries_for_jobs(db, &job_ids).await?;

        let inspections = latest_by(&inspections, |i| i.job_id, |i| i.id);
        let quotations = latest_by(&quotations, |q| q.job_id, |q| q.id);
        let approvals = latest_by(&approvals, |a| a.job_id, |a| a.id);
        let deliveries = latest_by(&deliveries, |d| d.job_id, |d| d.id);

        let inspection_ids: Vec<i32> = inspections.values().map(|i| i.id).collect();
        let mut parts_by_inspection: HashMap<i32, Vec<spare_part::Model>> = HashMap::new();
        for part in stage_repo::spare_parts_for_inspections(db, &inspection_ids).await? {
            parts_by_inspection
                .entry(part.inspection_id)
                .or_default()
                .push(part);
        }

        let views = rows
            .into_iter()
            .map(|(job, customer)| {
                let inspection = inspections.get(&job.id).copied();
                let spare_parts = inspection
                    .and_then(|i| parts_by_inspection.remove(&i.id))
                    .unwrap_or_default();
                let quotation = quotations.get(&job.id).copied();
                let approval = approvals.get(&job.id).copied();
                let delivery = deliveries.get(&job.id).copied();
                JobView::assemble(
                    job,
                    customer,
                    inspection,
                    quotation,
                    approval,
                    delivery,
                    spare_parts,
                )
            })
            .collect();

        Ok(views)
    }
}
