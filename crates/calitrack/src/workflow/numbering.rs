//! Business document numbers.
//!
//! Everything here is pure. Sequence values come from the counters in
//! [`crate::db::sequence_repo`] or from a scan of existing numbers.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::WorkflowError;

/// Largest suffix a job number can carry.
pub const MAX_JOB_SUFFIX: i32 = 9999;

/// Calibration track of a job request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "ACCREDITED")]
    Accredited,
    #[serde(rename = "NON-ACCREDITED")]
    NonAccredited,
}

impl JobType {
    pub fn as_str(self) -> &'static str {
        match self {
            JobType::Accredited => "ACCREDITED",
            JobType::NonAccredited => "NON-ACCREDITED",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; `_` and `-` are interchangeable.
impl FromStr for JobType {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('_', "-").as_str() {
            "ACCREDITED" => Ok(JobType::Accredited),
            "NON-ACCREDITED" | "NONACCREDITED" => Ok(JobType::NonAccredited),
            _ => Err(WorkflowError::Validation(format!("Unknown job type: {}", s))),
        }
    }
}

/// `JB<yyyy><MM><suffix:04>`.
pub fn job_number(date: NaiveDate, suffix: i32) -> String {
    format!("JB{:04}{:02}{:04}", date.year(), date.month(), suffix)
}

/// Random suffix in `1000..=9999`. Not collision-proof.
pub fn random_job_suffix() -> i32 {
    rand::rng().random_range(1000..=MAX_JOB_SUFFIX)
}

/// Counter key for sequential job numbers: one counter per month.
pub fn job_month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// `ASC<yy>/[A]<MM><DD><seq:02>`, with `A` for accredited work.
pub fn job_request_number(date: NaiveDate, job_type: JobType, sequence: i32) -> String {
    let accredited = match job_type {
        JobType::Accredited => "A",
        JobType::NonAccredited => "",
    };
    format!(
        "ASC{:02}/{}{:02}{:02}{:02}",
        date.year() % 100,
        accredited,
        date.month(),
        date.day(),
        sequence
    )
}

/// `<job request number>-<seq:02>`.
pub fn certificate_number(job_number: &str, sequence: i32) -> String {
    format!("{}-{:02}", job_number, sequence)
}

/// Numeric suffix of a certificate number issued under `job_number`.
pub fn certificate_suffix(job_number: &str, certificate_number: &str) -> Option<i32> {
    certificate_number
        .strip_prefix(job_number)?
        .strip_prefix('-')?
        .parse()
        .ok()
}

/// Next certificate sequence from the numbers already issued: max + 1, or
/// 1 when none parse.
pub fn next_scanned_sequence<S: AsRef<str>>(job_number: &str, existing: &[S]) -> i32 {
    existing
        .iter()
        .filter_map(|n| certificate_suffix(job_number, n.as_ref()))
        .max()
        .map_or(1, |max| max + 1)
}

/// Adds whole months, clamping the day to the end of the target month.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(chrono::Months::new(months))
}
