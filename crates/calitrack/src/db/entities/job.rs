//! Job entity: one scale moving through the repair pipeline.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `JB<yyyy><MM><4 digits>`, unique.
    #[sea_orm(unique)]
    pub job_number: String,
    pub customer_id: i32,
    pub taken_by: String,
    /// Pipeline status, see `workflow::JobStatus`.
    #[sea_orm(default_value = "pending_inspection")]
    pub status: String,
    pub scale_make: Option<String>,
    pub scale_model: Option<String>,
    pub scale_serial: Option<String>,
    pub remark: Option<String>,
    /// Customer purchase order, stamped on approval.
    pub lpo_number: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(has_many = "super::inspection::Entity")]
    Inspections,
    #[sea_orm(has_many = "super::quotation::Entity")]
    Quotations,
    #[sea_orm(has_many = "super::approval::Entity")]
    Approvals,
    #[sea_orm(has_one = "super::delivery::Entity")]
    Delivery,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::inspection::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inspections.def()
    }
}

impl Related<super::quotation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotations.def()
    }
}

impl Related<super::approval::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Approvals.def()
    }
}

impl Related<super::delivery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Delivery.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
