//! Request payloads for workflow operations.
//!
//! Fields are optional at the serde level so a missing field becomes a
//! [`WorkflowError::Validation`] from `validate()` rather than a
//! deserialization failure. Validation runs before any transaction opens.

use chrono::NaiveDate;
use serde::Deserialize;

use super::numbering::JobType;
use super::status::JobStatus;
use super::WorkflowError;

fn required<T>(value: Option<T>, field: &str) -> Result<T, WorkflowError> {
    value.ok_or_else(|| WorkflowError::Validation(format!("{} is required", field)))
}

fn required_text(value: Option<String>, field: &str) -> Result<String, WorkflowError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(WorkflowError::Validation(format!("{} is required", field))),
    }
}

/// Blank strings count as absent.
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl CustomerInput {
    pub fn validate(self) -> Result<ValidCustomer, WorkflowError> {
        Ok(ValidCustomer {
            name: required_text(self.name, "name")?,
            email: optional_text(self.email),
            phone: optional_text(self.phone),
            address: optional_text(self.address),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Intake of a scale for calibration or repair.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateJobInput {
    pub customer_id: Option<i32>,
    /// Defaults to the caller.
    pub taken_by: Option<String>,
    pub remark: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub lpo_number: Option<String>,
}

impl CreateJobInput {
    pub fn validate(self, caller: &str) -> Result<ValidJob, WorkflowError> {
        Ok(ValidJob {
            customer_id: required(self.customer_id, "customer_id")?,
            taken_by: optional_text(self.taken_by).unwrap_or_else(|| caller.to_string()),
            remark: optional_text(self.remark),
            scale_make: optional_text(self.make),
            scale_model: optional_text(self.model),
            scale_serial: optional_text(self.serial_number),
            lpo_number: optional_text(self.lpo_number),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidJob {
    pub customer_id: i32,
    pub taken_by: String,
    pub remark: Option<String>,
    pub scale_make: Option<String>,
    pub scale_model: Option<String>,
    pub scale_serial: Option<String>,
    pub lpo_number: Option<String>,
}

/// Spare part lines are passed through as submitted; a line missing a
/// field fails at insert time and rolls the whole inspection back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SparePartInput {
    pub part_name: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InspectionInput {
    pub job_id: Option<i32>,
    pub problems_found: Option<String>,
    pub inspected_by: Option<String>,
    pub inspection_date: Option<NaiveDate>,
    pub total_cost: Option<f64>,
    #[serde(default)]
    pub spare_parts: Vec<SparePartInput>,
    pub notes: Option<String>,
}

impl InspectionInput {
    pub fn validate(self) -> Result<ValidInspection, WorkflowError> {
        Ok(ValidInspection {
            job_id: required(self.job_id, "job_id")?,
            problems_found: required_text(self.problems_found, "problems_found")?,
            inspected_by: required_text(self.inspected_by, "inspected_by")?,
            inspection_date: required(self.inspection_date, "inspection_date")?,
            total_cost: self.total_cost,
            spare_parts: self.spare_parts,
            notes: optional_text(self.notes),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidInspection {
    pub job_id: i32,
    pub problems_found: String,
    pub inspected_by: String,
    pub inspection_date: NaiveDate,
    pub total_cost: Option<f64>,
    pub spare_parts: Vec<SparePartInput>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuotationInput {
    pub job_id: Option<i32>,
    pub quotation_number: Option<String>,
    pub quotation_date: Option<NaiveDate>,
    pub amount: Option<f64>,
}

impl QuotationInput {
    pub fn validate(self) -> Result<ValidQuotation, WorkflowError> {
        let amount = required(self.amount, "amount")?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(WorkflowError::validation("amount must be a non-negative number"));
        }
        Ok(ValidQuotation {
            job_id: required(self.job_id, "job_id")?,
            quotation_number: required_text(self.quotation_number, "quotation_number")?,
            quotation_date: required(self.quotation_date, "quotation_date")?,
            amount,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidQuotation {
    pub job_id: i32,
    pub quotation_number: String,
    pub quotation_date: NaiveDate,
    pub amount: f64,
}

/// The preparer is the authenticated caller, not a body field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovalInput {
    pub job_id: Option<i32>,
    pub lpo_number: Option<String>,
    pub approval_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl ApprovalInput {
    pub fn validate(self) -> Result<ValidApproval, WorkflowError> {
        Ok(ValidApproval {
            job_id: required(self.job_id, "job_id")?,
            lpo_number: required_text(self.lpo_number, "lpo_number")?,
            approval_date: required(self.approval_date, "approval_date")?,
            notes: optional_text(self.notes),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidApproval {
    pub job_id: i32,
    pub lpo_number: String,
    pub approval_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadyInput {
    pub delivery_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliveryInput {
    pub invoice_number: Option<String>,
    pub invoice_amount: Option<f64>,
    pub invoice_date: Option<NaiveDate>,
    pub delivered_by: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub status: Option<String>,
}

impl DeliveryInput {
    pub fn validate(self) -> Result<ValidDelivery, WorkflowError> {
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<JobStatus>)
            .transpose()?;
        Ok(ValidDelivery {
            invoice_number: required_text(self.invoice_number, "invoice_number")?,
            invoice_amount: self.invoice_amount,
            invoice_date: self.invoice_date,
            delivered_by: optional_text(self.delivered_by),
            delivery_date: self.delivery_date,
            status,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidDelivery {
    pub invoice_number: String,
    pub invoice_amount: Option<f64>,
    pub invoice_date: Option<NaiveDate>,
    pub delivered_by: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusChangeInput {
    pub status: Option<String>,
}

impl StatusChangeInput {
    pub fn validate(self) -> Result<JobStatus, WorkflowError> {
        required_text(self.status, "status")?.parse()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequestInput {
    pub job_type: Option<String>,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    pub customer_id: Option<i32>,
    pub notifications_enabled: Option<bool>,
}

impl JobRequestInput {
    pub fn validate(self, today: NaiveDate) -> Result<ValidJobRequest, WorkflowError> {
        Ok(ValidJobRequest {
            job_type: required_text(self.job_type, "jobType")?.parse()?,
            date: self.date.unwrap_or(today),
            customer_id: required(self.customer_id, "customerId")?,
            notifications_enabled: self.notifications_enabled.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidJobRequest {
    pub job_type: JobType,
    pub date: NaiveDate,
    pub customer_id: i32,
    pub notifications_enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CertificateInput {
    pub job_request_id: Option<i32>,
    pub date_of_calibration: Option<NaiveDate>,
    pub calibration_due_date: Option<NaiveDate>,
    pub equipment_name: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub capacity: Option<String>,
    pub resolution: Option<String>,
    pub location: Option<String>,
}

impl CertificateInput {
    pub fn validate(self) -> Result<ValidCertificate, WorkflowError> {
        let date_of_calibration = required(self.date_of_calibration, "date_of_calibration")?;
        if let Some(due) = self.calibration_due_date {
            if due < date_of_calibration {
                return Err(WorkflowError::validation(
                    "calibration_due_date is before date_of_calibration",
                ));
            }
        }
        Ok(ValidCertificate {
            job_request_id: required(self.job_request_id, "job_request_id")?,
            date_of_calibration,
            calibration_due_date: self.calibration_due_date,
            equipment_name: required_text(self.equipment_name, "equipment_name")?,
            manufacturer: optional_text(self.manufacturer),
            model: optional_text(self.model),
            serial_number: optional_text(self.serial_number),
            capacity: optional_text(self.capacity),
            resolution: optional_text(self.resolution),
            location: optional_text(self.location),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidCertificate {
    pub job_request_id: i32,
    pub date_of_calibration: NaiveDate,
    pub calibration_due_date: Option<NaiveDate>,
    pub equipment_name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub capacity: Option<String>,
    pub resolution: Option<String>,
    pub location: Option<String>,
}
