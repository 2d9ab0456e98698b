//! Generic keyed counter for job numbers and certificate numbers.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "document_sequences")]
pub struct Model {
    /// Document family, e.g. `job` or `certificate`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub scope: String,
    /// Key within the family, e.g. `2025-05` or a job request id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub scope_key: String,
    pub last_value: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
