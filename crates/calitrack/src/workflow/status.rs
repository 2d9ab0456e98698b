//! Job status values and the transition table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::WorkflowError;
use crate::config::TransitionPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    PendingInspection,
    PendingQuotation,
    PendingApproval,
    Approved,
    ReadyForDelivery,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub const ALL: [JobStatus; 7] = [
        JobStatus::PendingInspection,
        JobStatus::PendingQuotation,
        JobStatus::PendingApproval,
        JobStatus::Approved,
        JobStatus::ReadyForDelivery,
        JobStatus::Completed,
        JobStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::PendingInspection => "pending_inspection",
            JobStatus::PendingQuotation => "pending_quotation",
            JobStatus::PendingApproval => "pending_approval",
            JobStatus::Approved => "approved",
            JobStatus::ReadyForDelivery => "ready_for_delivery",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    /// The pipeline stage that follows this one.
    pub fn next(self) -> Option<JobStatus> {
        match self {
            JobStatus::PendingInspection => Some(JobStatus::PendingQuotation),
            JobStatus::PendingQuotation => Some(JobStatus::PendingApproval),
            JobStatus::PendingApproval => Some(JobStatus::Approved),
            JobStatus::Approved => Some(JobStatus::ReadyForDelivery),
            JobStatus::ReadyForDelivery => Some(JobStatus::Completed),
            JobStatus::Completed | JobStatus::Cancelled => None,
        }
    }

    /// Edges of the strict transition table: one step along the pipeline,
    /// or cancellation of any job that has not finished.
    pub fn can_transition_to(self, to: JobStatus) -> bool {
        if to == JobStatus::Cancelled {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| WorkflowError::Validation(format!("Unknown job status: {}", s)))
    }
}

/// Checks a requested transition against the configured policy.
pub fn check_transition(
    policy: TransitionPolicy,
    from: JobStatus,
    to: JobStatus,
) -> Result<(), WorkflowError> {
    let allowed = match policy {
        TransitionPolicy::Strict => from.can_transition_to(to),
        TransitionPolicy::Permissive => true,
    };
    if allowed {
        Ok(())
    } else {
        Err(WorkflowError::IllegalTransition {
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&JobStatus::ReadyForDelivery).unwrap();
        assert_eq!(json, "\"ready_for_delivery\"");
    }

    #[test]
    fn test_pipeline_edges() {
        let pipeline = [
            JobStatus::PendingInspection,
            JobStatus::PendingQuotation,
            JobStatus::PendingApproval,
            JobStatus::Approved,
            JobStatus::ReadyForDelivery,
            JobStatus::Completed,
        ];
        for pair in pipeline.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
            assert!(!pair[1].can_transition_to(pair[0]), "{} -> {}", pair[1], pair[0]);
        }
    }

    #[test]
    fn test_skipping_stages_rejected() {
        assert!(!JobStatus::PendingInspection.can_transition_to(JobStatus::Completed));
        assert!(!JobStatus::PendingQuotation.can_transition_to(JobStatus::Approved));
        assert!(!JobStatus::Approved.can_transition_to(JobStatus::Approved));
    }

    #[test]
    fn test_cancellation() {
        for status in JobStatus::ALL {
            assert_eq!(
                status.can_transition_to(JobStatus::Cancelled),
                !status.is_terminal(),
                "{}",
                status
            );
        }
        assert!(!JobStatus::Cancelled.can_transition_to(JobStatus::PendingInspection));
    }

    #[test]
    fn test_policy() {
        let strict = check_transition(
            TransitionPolicy::Strict,
            JobStatus::PendingInspection,
            JobStatus::Completed,
        );
        assert!(matches!(
            strict,
            Err(WorkflowError::IllegalTransition { .. })
        ));

        assert!(check_transition(
            TransitionPolicy::Permissive,
            JobStatus::PendingInspection,
            JobStatus::Completed,
        )
        .is_ok());
    }
}
