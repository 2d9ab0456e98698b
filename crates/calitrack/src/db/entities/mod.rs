//! Database entities.

pub mod approval;
pub mod certificate;
pub mod customer;
pub mod delivery;
pub mod document_sequence;
pub mod inspection;
pub mod job;
pub mod job_request;
pub mod job_sequence;
pub mod quotation;
pub mod spare_part;

pub use approval::Entity as Approval;
pub use certificate::Entity as Certificate;
pub use customer::Entity as Customer;
pub use delivery::Entity as Delivery;
pub use document_sequence::Entity as DocumentSequence;
pub use inspection::Entity as Inspection;
pub use job::Entity as Job;
pub use job_request::Entity as JobRequest;
pub use job_sequence::Entity as JobSequence;
pub use quotation::Entity as Quotation;
pub use spare_part::Entity as SparePart;
