//! Migration for the calibration-certificate track: job requests, their
//! per-day sequence counters and certificates.

use sea_orm_migration::{prelude::*, schema::*};

use super::m20250501_000001_create_customers_and_jobs::Customers;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobRequests::Table)
                    .if_not_exists()
                    .col(pk_auto(JobRequests::Id))
                    .col(string(JobRequests::JobNumber))
                    .col(date(JobRequests::Date))
                    .col(string(JobRequests::JobType))
                    .col(integer(JobRequests::CustomerId))
                    .col(string(JobRequests::CreatedBy))
                    .col(boolean(JobRequests::NotificationsEnabled).default(true))
                    .col(timestamp_with_time_zone(JobRequests::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_requests_customer_id")
                            .from(JobRequests::Table, JobRequests::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JobSequences::Table)
                    .if_not_exists()
                    .col(date(JobSequences::SequenceDate))
                    .col(string(JobSequences::JobType))
                    .col(integer(JobSequences::LastSequence))
                    .primary_key(
                        Index::create()
                            .col(JobSequences::SequenceDate)
                            .col(JobSequences::JobType),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Certificates::Table)
                    .if_not_exists()
                    .col(pk_auto(Certificates::Id))
                    .col(integer(Certificates::JobRequestId))
                    .col(string(Certificates::CertificateNumber))
                    .col(date(Certificates::DateOfCalibration))
                    .col(date(Certificates::CalibrationDueDate))
                    .col(string(Certificates::EquipmentName))
                    .col(string_null(Certificates::Manufacturer))
                    .col(string_null(Certificates::Model))
                    .col(string_null(Certificates::SerialNumber))
                    .col(string_null(Certificates::Capacity))
                    .col(string_null(Certificates::Resolution))
                    .col(string_null(Certificates::Location))
                    .col(timestamp_with_time_zone(Certificates::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificates_job_request_id")
                            .from(Certificates::Table, Certificates::JobRequestId)
                            .to(JobRequests::Table, JobRequests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_requests_job_number")
                    .table(JobRequests::Table)
                    .col(JobRequests::JobNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Turns a scan-numbering race into a constraint violation.
        manager
            .create_index(
                Index::create()
                    .name("idx_certificates_request_number")
                    .table(Certificates::Table)
                    .col(Certificates::JobRequestId)
                    .col(Certificates::CertificateNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Certificates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobSequences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobRequests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum JobRequests {
    Table,
    Id,
    JobNumber,
    Date,
    JobType,
    CustomerId,
    CreatedBy,
    NotificationsEnabled,
    CreatedAt,
}

#[derive(DeriveIden)]
enum JobSequences {
    Table,
    SequenceDate,
    JobType,
    LastSequence,
}

#[derive(DeriveIden)]
enum Certificates {
    Table,
    Id,
    JobRequestId,
    CertificateNumber,
    DateOfCalibration,
    CalibrationDueDate,
    EquipmentName,
    Manufacturer,
    Model,
    SerialNumber,
    Capacity,
    Resolution,
    Location,
    CreatedAt,
}
