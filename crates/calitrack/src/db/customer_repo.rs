//! Customer repository: CRUD operations for the `customers` table.

use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, QueryOrder, Set};

use super::entities::customer;

/// Fields of a customer to be inserted.
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Inserts a new customer row.
pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    customer: NewCustomer,
) -> Result<customer::Model, DbErr> {
    customer::ActiveModel {
        name: Set(customer.name),
        email: Set(customer.email),
        phone: Set(customer.phone),
        address: Set(customer.address),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Finds a customer by its ID.
pub async fn find<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<customer::Model>, DbErr> {
    customer::Entity::find_by_id(id).one(conn).await
}

/// Lists all customers ordered by name.
pub async fn list<C: ConnectionTrait>(conn: &C) -> Result<Vec<customer::Model>, DbErr> {
    customer::Entity::find()
        .order_by_asc(customer::Column::Name)
        .order_by_asc(customer::Column::Id)
        .all(conn)
        .await
}
