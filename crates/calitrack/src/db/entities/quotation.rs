//! Quotation entity: priced offer sent before approval.

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Status written when a quotation is created.
pub const STATUS_SENT: &str = "sent";
/// Status written when the job's approval is recorded.
pub const STATUS_APPROVED: &str = "approved";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "quotations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub job_id: i32,
    #[sea_orm(unique)]
    pub quotation_number: String,
    pub quotation_date: Date,
    pub amount: f64,
    #[sea_orm(default_value = "sent")]
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::job::Entity",
        from = "Column::JobId",
        to = "super::job::Column::Id"
    )]
    Job,
}

impl Related<super::job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
