//! Initial migration: customers and the jobs pipeline table.

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(pk_auto(Customers::Id))
                    .col(string(Customers::Name))
                    .col(string_null(Customers::Email))
                    .col(string_null(Customers::Phone))
                    .col(text_null(Customers::Address))
                    .col(timestamp_with_time_zone(Customers::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(pk_auto(Jobs::Id))
                    .col(string(Jobs::JobNumber))
                    .col(integer(Jobs::CustomerId))
                    .col(string(Jobs::TakenBy))
                    .col(string(Jobs::Status).default("pending_inspection"))
                    .col(string_null(Jobs::ScaleMake))
                    .col(string_null(Jobs::ScaleModel))
                    .col(string_null(Jobs::ScaleSerial))
                    .col(text_null(Jobs::Remark))
                    .col(string_null(Jobs::LpoNumber))
                    .col(timestamp_with_time_zone(Jobs::CreatedAt))
                    .col(timestamp_with_time_zone(Jobs::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_jobs_customer_id")
                            .from(Jobs::Table, Jobs::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_job_number")
                    .table(Jobs::Table)
                    .col(Jobs::JobNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Per-status list screens filter on status and sort by creation time.
        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_status_created_at")
                    .table(Jobs::Table)
                    .col(Jobs::Status)
                    .col(Jobs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_customer_id")
                    .table(Jobs::Table)
                    .col(Jobs::CustomerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(super) enum Customers {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Address,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(super) enum Jobs {
    Table,
    Id,
    JobNumber,
    CustomerId,
    TakenBy,
    Status,
    ScaleMake,
    ScaleModel,
    ScaleSerial,
    Remark,
    LpoNumber,
    CreatedAt,
    UpdatedAt,
}
