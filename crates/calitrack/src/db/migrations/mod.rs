//! Database migrations.

use sea_orm_migration::prelude::*;

mod m20250501_000001_create_customers_and_jobs;
mod m20250501_000002_create_stage_tables;
mod m20250501_000003_create_job_requests;
mod m20250612_000001_create_document_sequences;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250501_000001_create_customers_and_jobs::Migration),
            Box::new(m20250501_000002_create_stage_tables::Migration),
            Box::new(m20250501_000003_create_job_requests::Migration),
            Box::new(m20250612_000001_create_document_sequences::Migration),
        ]
    }
}
