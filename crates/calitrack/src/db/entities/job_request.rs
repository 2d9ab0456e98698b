//! Job request entity: the calibration-certificate track.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "job_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `ASC<yy>/[A]<MM><DD><seq>`, unique.
    #[sea_orm(unique)]
    pub job_number: String,
    pub date: Date,
    /// `ACCREDITED` or `NON-ACCREDITED`.
    pub job_type: String,
    pub customer_id: i32,
    pub created_by: String,
    pub notifications_enabled: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(has_many = "super::certificate::Entity")]
    Certificates,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::certificate::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Certificates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
