//! Job repository: CRUD operations for the `jobs` table.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::entities::{customer, job};

/// Status every job starts in.
pub const INITIAL_STATUS: &str = "pending_inspection";

/// Fields of a job taken in at intake.
#[derive(Debug, Clone, Default)]
pub struct NewJob {
    pub job_number: String,
    pub customer_id: i32,
    pub taken_by: String,
    pub scale_make: Option<String>,
    pub scale_model: Option<String>,
    pub scale_serial: Option<String>,
    pub remark: Option<String>,
    pub lpo_number: Option<String>,
}

/// Inserts a new job in the initial status.
pub async fn insert<C: ConnectionTrait>(conn: &C, job: NewJob) -> Result<job::Model, DbErr> {
    let now = chrono::Utc::now();
    job::ActiveModel {
        job_number: Set(job.job_number),
        customer_id: Set(job.customer_id),
        taken_by: Set(job.taken_by),
        status: Set(INITIAL_STATUS.to_string()),
        scale_make: Set(job.scale_make),
        scale_model: Set(job.scale_model),
        scale_serial: Set(job.scale_serial),
        remark: Set(job.remark),
        lpo_number: Set(job.lpo_number),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Finds a job by its ID.
pub async fn find<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<job::Model>, DbErr> {
    job::Entity::find_by_id(id).one(conn).await
}

/// Finds a job by its ID together with its customer.
pub async fn find_with_customer<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<(job::Model, Option<customer::Model>)>, DbErr> {
    job::Entity::find_by_id(id)
        .find_also_related(customer::Entity)
        .one(conn)
        .await
}

/// Lists jobs with their customers, newest first, optionally restricted
/// to one status.
pub async fn list_with_customers<C: ConnectionTrait>(
    conn: &C,
    status: Option<&str>,
) -> Result<Vec<(job::Model, Option<customer::Model>)>, DbErr> {
    let mut query = job::Entity::find().find_also_related(customer::Entity);
    if let Some(status) = status {
        query = query.filter(job::Column::Status.eq(status));
    }
    query
        .order_by_desc(job::Column::CreatedAt)
        .order_by_desc(job::Column::Id)
        .all(conn)
        .await
}

/// Writes a new status.
///
/// With `expected` set the write is a compare-and-set: it only applies
/// while the row still holds that status. Returns the affected row count,
/// so 0 means the job is missing or its status moved on.
pub async fn update_status<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    status: &str,
    expected: Option<&str>,
) -> Result<u64, DbErr> {
    let mut update = job::Entity::update_many()
        .col_expr(job::Column::Status, Expr::value(status))
        .col_expr(job::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(job::Column::Id.eq(id));
    if let Some(expected) = expected {
        update = update.filter(job::Column::Status.eq(expected));
    }
    Ok(update.exec(conn).await?.rows_affected)
}

/// Stamps the customer's purchase order number onto a job.
pub async fn set_lpo_number<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    lpo_number: &str,
) -> Result<u64, DbErr> {
    let result = job::Entity::update_many()
        .col_expr(job::Column::LpoNumber, Expr::value(lpo_number))
        .col_expr(job::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(job::Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Counts jobs per stored status.
pub async fn count_by_status<C: ConnectionTrait>(conn: &C) -> Result<Vec<(String, i64)>, DbErr> {
    job::Entity::find()
        .select_only()
        .column(job::Column::Status)
        .column_as(job::Column::Id.count(), "count")
        .group_by(job::Column::Status)
        .into_tuple::<(String, i64)>()
        .all(conn)
        .await
}
