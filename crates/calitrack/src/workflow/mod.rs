//! Job workflow core: status machine, document numbering and the
//! transactional stage operations built on them.

pub mod error;
pub mod inputs;
pub mod machine;
pub mod numbering;
pub mod requests;
pub mod sequence;
pub mod status;
pub mod views;

pub use error::WorkflowError;
pub use machine::{CreatedJob, InspectionRecord, JobWorkflow, Transition, WorkflowSettings};
pub use numbering::JobType;
pub use status::{check_transition, JobStatus};
pub use views::{DashboardSummary, JobRequestView, JobView};
