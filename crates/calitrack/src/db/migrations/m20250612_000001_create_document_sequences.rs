//! Migration adding the keyed counter table used for job numbers and
//! certificate numbers.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DocumentSequences::Table)
                    .if_not_exists()
                    .col(string(DocumentSequences::Scope))
                    .col(string(DocumentSequences::ScopeKey))
                    .col(integer(DocumentSequences::LastValue))
                    .primary_key(
                        Index::create()
                            .col(DocumentSequences::Scope)
                            .col(DocumentSequences::ScopeKey),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocumentSequences::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DocumentSequences {
    Table,
    Scope,
    ScopeKey,
    LastValue,
}
