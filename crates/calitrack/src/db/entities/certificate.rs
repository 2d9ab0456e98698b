//! Calibration certificate issued against a job request.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "certificates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub job_request_id: i32,
    /// `<job request number>-<seq>`, unique per job request.
    pub certificate_number: String,
    pub date_of_calibration: Date,
    pub calibration_due_date: Date,
    pub equipment_name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub capacity: Option<String>,
    pub resolution: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::job_request::Entity",
        from = "Column::JobRequestId",
        to = "super::job_request::Column::Id"
    )]
    JobRequest,
}

impl Related<super::job_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
