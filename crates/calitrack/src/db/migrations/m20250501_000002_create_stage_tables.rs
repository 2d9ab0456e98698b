//! Migration for the per-stage child tables: inspections, spare parts,
//! quotations, approvals and deliveries.

use sea_orm_migration::{prelude::*, schema::*};

use super::m20250501_000001_create_customers_and_jobs::Jobs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Inspections::Table)
                    .if_not_exists()
                    .col(pk_auto(Inspections::Id))
                    .col(integer(Inspections::JobId))
                    .col(text(Inspections::ProblemsFound))
                    .col(string(Inspections::InspectedBy))
                    .col(date(Inspections::InspectionDate))
                    .col(double_null(Inspections::TotalCost))
                    .col(text_null(Inspections::Notes))
                    .col(timestamp_with_time_zone(Inspections::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inspections_job_id")
                            .from(Inspections::Table, Inspections::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SpareParts::Table)
                    .if_not_exists()
                    .col(pk_auto(SpareParts::Id))
                    .col(integer(SpareParts::InspectionId))
                    .col(string(SpareParts::PartName))
                    .col(integer(SpareParts::Quantity))
                    .col(double(SpareParts::UnitPrice))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_spare_parts_inspection_id")
                            .from(SpareParts::Table, SpareParts::InspectionId)
                            .to(Inspections::Table, Inspections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Quotations::Table)
                    .if_not_exists()
                    .col(pk_auto(Quotations::Id))
                    .col(integer(Quotations::JobId))
                    .col(string(Quotations::QuotationNumber))
                    .col(date(Quotations::QuotationDate))
                    .col(double(Quotations::Amount))
                    .col(string(Quotations::Status).default("sent"))
                    .col(timestamp_with_time_zone(Quotations::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quotations_job_id")
                            .from(Quotations::Table, Quotations::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Approvals::Table)
                    .if_not_exists()
                    .col(pk_auto(Approvals::Id))
                    .col(integer(Approvals::JobId))
                    .col(string(Approvals::LpoNumber))
                    .col(date(Approvals::ApprovalDate))
                    .col(string(Approvals::PreparedBy))
                    .col(text_null(Approvals::Notes))
                    .col(timestamp_with_time_zone(Approvals::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_approvals_job_id")
                            .from(Approvals::Table, Approvals::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Deliveries::Table)
                    .if_not_exists()
                    .col(pk_auto(Deliveries::Id))
                    .col(integer(Deliveries::JobId))
                    .col(string_null(Deliveries::PreparedBy))
                    .col(string_null(Deliveries::InvoiceNumber))
                    .col(double_null(Deliveries::InvoiceAmount))
                    .col(date_null(Deliveries::InvoiceDate))
                    .col(string_null(Deliveries::DeliveredBy))
                    .col(date_null(Deliveries::DeliveryDate))
                    .col(timestamp_with_time_zone(Deliveries::CreatedAt))
                    .col(timestamp_with_time_zone(Deliveries::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deliveries_job_id")
                            .from(Deliveries::Table, Deliveries::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_inspections_job_id")
                    .table(Inspections::Table)
                    .col(Inspections::JobId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_spare_parts_inspection_id")
                    .table(SpareParts::Table)
                    .col(SpareParts::InspectionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_quotations_quotation_number")
                    .table(Quotations::Table)
                    .col(Quotations::QuotationNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_quotations_job_id")
                    .table(Quotations::Table)
                    .col(Quotations::JobId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_approvals_job_id")
                    .table(Approvals::Table)
                    .col(Approvals::JobId)
                    .to_owned(),
            )
            .await?;

        // Upsert target: one delivery row per job.
        manager
            .create_index(
                Index::create()
                    .name("idx_deliveries_job_id")
                    .table(Deliveries::Table)
                    .col(Deliveries::JobId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Deliveries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Approvals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Quotations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SpareParts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Inspections::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Inspections {
    Table,
    Id,
    JobId,
    ProblemsFound,
    InspectedBy,
    InspectionDate,
    TotalCost,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SpareParts {
    Table,
    Id,
    InspectionId,
    PartName,
    Quantity,
    UnitPrice,
}

#[derive(DeriveIden)]
enum Quotations {
    Table,
    Id,
    JobId,
    QuotationNumber,
    QuotationDate,
    Amount,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Approvals {
    Table,
    Id,
    JobId,
    LpoNumber,
    ApprovalDate,
    PreparedBy,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Deliveries {
    Table,
    Id,
    JobId,
    PreparedBy,
    InvoiceNumber,
    InvoiceAmount,
    InvoiceDate,
    DeliveredBy,
    DeliveryDate,
    CreatedAt,
    UpdatedAt,
}
