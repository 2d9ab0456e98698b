//! Shared test utilities for calitrack integration tests.
//!
//! `TestHarness` owns a private in-memory database, a workflow service over
//! it and one seeded customer. The stage helpers drive a job through the
//! pipeline with fixed, valid inputs.

#![allow(dead_code)]

use chrono::NaiveDate;

use calitrack::config::TransitionPolicy;
use calitrack::db::open_in_memory;
use sea_orm::ConnectionTrait;
use calitrack::workflow::inputs::{
    ApprovalInput, CreateJobInput, CustomerInput, DeliveryInput, InspectionInput, QuotationInput,
    ReadyInput, SparePartInput,
};
use calitrack::workflow::CreatedJob;
use calitrack::{JobWorkflow, WorkflowSettings};

pub const CALLER: &str = "frontdesk";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub struct TestHarness {
    pub workflow: JobWorkflow,
    pub customer_id: i32,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_settings(WorkflowSettings::default()).await
    }

    pub async fn permissive() -> Self {
        Self::with_settings(WorkflowSettings {
            transition_policy: TransitionPolicy::Permissive,
            ..Default::default()
        })
        .await
    }

    pub async fn with_settings(settings: WorkflowSettings) -> Self {
        let db = open_in_memory()
            .await
            .expect("Failed to create test database");
        let workflow = JobWorkflow::new(db, settings);
        let customer = workflow
            .create_customer(CustomerInput {
                name: Some("Acme Weighing".to_string()),
                email: Some("desk@acme.test".to_string()),
                ..Default::default()
            })
            .await
            .expect("Failed to seed customer");
        Self {
            workflow,
            customer_id: customer.id,
        }
    }

    pub async fn create_job(&self) -> CreatedJob {
        self.workflow
            .create_job(
                CreateJobInput {
                    customer_id: Some(self.customer_id),
                    make: Some("Avery".to_string()),
                    model: Some("L111".to_string()),
                    serial_number: Some("SN-0042".to_string()),
                    ..Default::default()
                },
                CALLER,
            )
            .await
            .expect("Failed to create job")
    }

    /// Makes every later status write fail, so a unit of work errors after
    /// its child rows are written.
    pub async fn freeze_job_status(&self) {
        self.workflow
            .db()
            .execute_unprepared(
                "CREATE TRIGGER freeze_job_status BEFORE UPDATE OF status ON jobs \
                 BEGIN SELECT RAISE(ABORT, 'job status is frozen'); END;",
            )
            .await
            .expect("Failed to create trigger");
    }

    pub async fn status_of(&self, job_id: i32) -> String {
        self.workflow
            .get_job(job_id)
            .await
            .expect("job exists")
            .status
    }
}

pub fn inspection(job_id: i32, spare_parts: Vec<SparePartInput>) -> InspectionInput {
    InspectionInput {
        job_id: Some(job_id),
        problems_found: Some("Indicator drifts under load".to_string()),
        inspected_by: Some("tech".to_string()),
        inspection_date: Some(date(2025, 5, 2)),
        total_cost: Some(240.0),
        spare_parts,
        notes: None,
    }
}

pub fn spare_part(name: &str, quantity: i32, unit_price: f64) -> SparePartInput {
    SparePartInput {
        part_name: Some(name.to_string()),
        quantity: Some(quantity),
        unit_price: Some(unit_price),
    }
}

pub fn quotation(job_id: i32, number: &str) -> QuotationInput {
    QuotationInput {
        job_id: Some(job_id),
        quotation_number: Some(number.to_string()),
        quotation_date: Some(date(2025, 5, 3)),
        amount: Some(240.0),
    }
}

pub fn approval(job_id: i32) -> ApprovalInput {
    ApprovalInput {
        job_id: Some(job_id),
        lpo_number: Some("LPO-7781".to_string()),
        approval_date: Some(date(2025, 5, 5)),
        notes: None,
    }
}

pub fn ready() -> ReadyInput {
    ReadyInput {
        delivery_date: Some(date(2025, 5, 9)),
    }
}

pub fn delivery(invoice_number: &str, status: Option<&str>) -> DeliveryInput {
    DeliveryInput {
        invoice_number: Some(invoice_number.to_string()),
        invoice_amount: Some(240.0),
        invoice_date: Some(date(2025, 5, 10)),
        delivered_by: Some("driver".to_string()),
        delivery_date: Some(date(2025, 5, 10)),
        status: status.map(str::to_string),
    }
}
