//! Stage repository: inspections, spare parts, quotations, approvals and
//! deliveries attached to a job.

use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::{approval, delivery, inspection, quotation, spare_part};

fn set_or_not<V>(value: Option<V>) -> ActiveValue<V>
where
    V: Into<sea_orm::Value>,
{
    match value {
        Some(v) => Set(v),
        None => NotSet,
    }
}

#[derive(Debug, Clone)]
pub struct NewInspection {
    pub job_id: i32,
    pub problems_found: String,
    pub inspected_by: String,
    pub inspection_date: NaiveDate,
    pub total_cost: Option<f64>,
    pub notes: Option<String>,
}

pub async fn insert_inspection<C: ConnectionTrait>(
    conn: &C,
    new: NewInspection,
) -> Result<inspection::Model, DbErr> {
    inspection::ActiveModel {
        job_id: Set(new.job_id),
        problems_found: Set(new.problems_found),
        inspected_by: Set(new.inspected_by),
        inspection_date: Set(new.inspection_date),
        total_cost: Set(new.total_cost),
        notes: Set(new.notes),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// A spare part line as submitted. Missing fields are left unset and
/// rejected by the store's NOT NULL constraints.
#[derive(Debug, Clone, Default)]
pub struct NewSparePart {
    pub inspection_id: i32,
    pub part_name: Option<String>,
    pub quantity: Option<i32>,
    pub unit_price: Option<f64>,
}

pub async fn insert_spare_part<C: ConnectionTrait>(
    conn: &C,
    new: NewSparePart,
) -> Result<spare_part::Model, DbErr> {
    spare_part::ActiveModel {
        inspection_id: Set(new.inspection_id),
        part_name: set_or_not(new.part_name),
        quantity: set_or_not(new.quantity),
        unit_price: set_or_not(new.unit_price),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Returns true if any quotation already carries this number.
pub async fn quotation_number_exists<C: ConnectionTrait>(
    conn: &C,
    quotation_number: &str,
) -> Result<bool, DbErr> {
    let count = quotation::Entity::find()
        .filter(quotation::Column::QuotationNumber.eq(quotation_number))
        .count(conn)
        .await?;
    Ok(count > 0)
}

#[derive(Debug, Clone)]
pub struct NewQuotation {
    pub job_id: i32,
    pub quotation_number: String,
    pub quotation_date: NaiveDate,
    pub amount: f64,
}

/// Inserts a quotation in the `sent` status.
pub async fn insert_quotation<C: ConnectionTrait>(
    conn: &C,
    new: NewQuotation,
) -> Result<quotation::Model, DbErr> {
    quotation::ActiveModel {
        job_id: Set(new.job_id),
        quotation_number: Set(new.quotation_number),
        quotation_date: Set(new.quotation_date),
        amount: Set(new.amount),
        status: Set(quotation::STATUS_SENT.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Marks every quotation of a job as approved.
pub async fn approve_quotations<C: ConnectionTrait>(conn: &C, job_id: i32) -> Result<u64, DbErr> {
    let result = quotation::Entity::update_many()
        .col_expr(
            quotation::Column::Status,
            Expr::value(quotation::STATUS_APPROVED),
        )
        .filter(quotation::Column::JobId.eq(job_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

#[derive(Debug, Clone)]
pub struct NewApproval {
    pub job_id: i32,
    pub lpo_number: String,
    pub approval_date: NaiveDate,
    pub prepared_by: String,
    pub notes: Option<String>,
}

pub async fn insert_approval<C: ConnectionTrait>(
    conn: &C,
    new: NewApproval,
) -> Result<approval::Model, DbErr> {
    approval::ActiveModel {
        job_id: Set(new.job_id),
        lpo_number: Set(new.lpo_number),
        approval_date: Set(new.approval_date),
        prepared_by: Set(new.prepared_by),
        notes: Set(new.notes),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

pub async fn find_approval<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<approval::Model>, DbErr> {
    approval::Entity::find_by_id(id).one(conn).await
}

pub async fn find_delivery<C: ConnectionTrait>(
    conn: &C,
    job_id: i32,
) -> Result<Option<delivery::Model>, DbErr> {
    delivery::Entity::find()
        .filter(delivery::Column::JobId.eq(job_id))
        .one(conn)
        .await
}

async fn upsert_delivery<C: ConnectionTrait>(
    conn: &C,
    job_id: i32,
    row: delivery::ActiveModel,
    update: Vec<delivery::Column>,
) -> Result<delivery::Model, DbErr> {
    delivery::Entity::insert(row)
        .on_conflict(
            OnConflict::column(delivery::Column::JobId)
                .update_columns(update)
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    find_delivery(conn, job_id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("delivery for job {}", job_id)))
}

/// Creates the delivery row for a job that is ready, or refreshes who
/// prepared it and the planned date if the row exists.
pub async fn ensure_delivery_stub<C: ConnectionTrait>(
    conn: &C,
    job_id: i32,
    prepared_by: &str,
    delivery_date: NaiveDate,
) -> Result<delivery::Model, DbErr> {
    let now = chrono::Utc::now();
    let row = delivery::ActiveModel {
        job_id: Set(job_id),
        prepared_by: Set(Some(prepared_by.to_string())),
        delivery_date: Set(Some(delivery_date)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    upsert_delivery(
        conn,
        job_id,
        row,
        vec![
            delivery::Column::PreparedBy,
            delivery::Column::DeliveryDate,
            delivery::Column::UpdatedAt,
        ],
    )
    .await
}

/// Invoice and handover details. Fields left `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct DeliveryRecord {
    pub invoice_number: Option<String>,
    pub invoice_amount: Option<f64>,
    pub invoice_date: Option<NaiveDate>,
    pub delivered_by: Option<String>,
    pub delivery_date: Option<NaiveDate>,
}

/// Upserts the invoice and handover details of a job's delivery row.
/// Repeating the same record leaves exactly one row behind.
pub async fn record_delivery<C: ConnectionTrait>(
    conn: &C,
    job_id: i32,
    record: DeliveryRecord,
) -> Result<delivery::Model, DbErr> {
    let mut update = vec![delivery::Column::UpdatedAt];
    if record.invoice_number.is_some() {
        update.push(delivery::Column::InvoiceNumber);
    }
    if record.invoice_amount.is_some() {
        update.push(delivery::Column::InvoiceAmount);
    }
    if record.invoice_date.is_some() {
        update.push(delivery::Column::InvoiceDate);
    }
    if record.delivered_by.is_some() {
        update.push(delivery::Column::DeliveredBy);
    }
    if record.delivery_date.is_some() {
        update.push(delivery::Column::DeliveryDate);
    }

    let now = chrono::Utc::now();
    let row = delivery::ActiveModel {
        job_id: Set(job_id),
        invoice_number: Set(record.invoice_number),
        invoice_amount: Set(record.invoice_amount),
        invoice_date: Set(record.invoice_date),
        delivered_by: Set(record.delivered_by),
        delivery_date: Set(record.delivery_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    upsert_delivery(conn, job_id, row, update).await
}

pub async fn inspections_for_jobs<C: ConnectionTrait>(
    conn: &C,
    job_ids: &[i32],
) -> Result<Vec<inspection::Model>, DbErr> {
    if job_ids.is_empty() {
        return Ok(Vec::new());
    }
    inspection::Entity::find()
        .filter(inspection::Column::JobId.is_in(job_ids.to_vec()))
        .order_by_asc(inspection::Column::Id)
        .all(conn)
        .await
}

pub async fn spare_parts_for_inspections<C: ConnectionTrait>(
    conn: &C,
    inspection_ids: &[i32],
) -> Result<Vec<spare_part::Model>, DbErr> {
    if inspection_ids.is_empty() {
        return Ok(Vec::new());
    }
    spare_part::Entity::find()
        .filter(spare_part::Column::InspectionId.is_in(inspection_ids.to_vec()))
        .order_by_asc(spare_part::Column::Id)
        .all(conn)
        .await
}

pub async fn quotations_for_jobs<C: ConnectionTrait>(
    conn: &C,
    job_ids: &[i32],
) -> Result<Vec<quotation::Model>, DbErr> {
    if job_ids.is_empty() {
        return Ok(Vec::new());
    }
    quotation::Entity::find()
        .filter(quotation::Column::JobId.is_in(job_ids.to_vec()))
        .order_by_asc(quotation::Column::Id)
        .all(conn)
        .await
}

pub async fn approvals_for_jobs<C: ConnectionTrait>(
    conn: &C,
    job_ids: &[i32],
) -> Result<Vec<approval::Model>, DbErr> {
    if job_ids.is_empty() {
        return Ok(Vec::new());
    }
    approval::Entity::find()
        .filter(approval::Column::JobId.is_in(job_ids.to_vec()))
        .order_by_asc(approval::Column::Id)
        .all(conn)
        .await
}

pub async fn deliveries_for_jobs<C: ConnectionTrait>(
    conn: &C,
    job_ids: &[i32],
) -> Result<Vec<delivery::Model>, DbErr> {
    if job_ids.is_empty() {
        return Ok(Vec::new());
    }
    delivery::Entity::find()
        .filter(delivery::Column::JobId.is_in(job_ids.to_vec()))
        .all(conn)
        .await
}
