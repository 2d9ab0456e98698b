//! Job request and certificate repository.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::entities::{certificate, customer, job_request};

#[derive(Debug, Clone)]
pub struct NewJobRequest {
    pub job_number: String,
    pub date: NaiveDate,
    pub job_type: String,
    pub customer_id: i32,
    pub created_by: String,
    pub notifications_enabled: bool,
}

pub async fn insert_job_request<C: ConnectionTrait>(
    conn: &C,
    new: NewJobRequest,
) -> Result<job_request::Model, DbErr> {
    job_request::ActiveModel {
        job_number: Set(new.job_number),
        date: Set(new.date),
        job_type: Set(new.job_type),
        customer_id: Set(new.customer_id),
        created_by: Set(new.created_by),
        notifications_enabled: Set(new.notifications_enabled),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

pub async fn find_job_request<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<job_request::Model>, DbErr> {
    job_request::Entity::find_by_id(id).one(conn).await
}

/// Finds a job request together with its customer.
pub async fn find_job_request_with_customer<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<(job_request::Model, Option<customer::Model>)>, DbErr> {
    job_request::Entity::find_by_id(id)
        .find_also_related(customer::Entity)
        .one(conn)
        .await
}

/// Certificate numbers of a job request that start with `<prefix>-`.
pub async fn certificate_numbers_with_prefix<C: ConnectionTrait>(
    conn: &C,
    job_request_id: i32,
    prefix: &str,
) -> Result<Vec<String>, DbErr> {
    certificate::Entity::find()
        .select_only()
        .column(certificate::Column::CertificateNumber)
        .filter(certificate::Column::JobRequestId.eq(job_request_id))
        .filter(certificate::Column::CertificateNumber.starts_with(format!("{}-", prefix)))
        .into_tuple::<String>()
        .all(conn)
        .await
}

#[derive(Debug, Clone)]
pub struct NewCertificate {
    pub job_request_id: i32,
    pub certificate_number: String,
    pub date_of_calibration: NaiveDate,
    pub calibration_due_date: NaiveDate,
    pub equipment_name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub capacity: Option<String>,
    pub resolution: Option<String>,
    pub location: Option<String>,
}

pub async fn insert_certificate<C: ConnectionTrait>(
    conn: &C,
    new: NewCertificate,
) -> Result<certificate::Model, DbErr> {
    certificate::ActiveModel {
        job_request_id: Set(new.job_request_id),
        certificate_number: Set(new.certificate_number),
        date_of_calibration: Set(new.date_of_calibration),
        calibration_due_date: Set(new.calibration_due_date),
        equipment_name: Set(new.equipment_name),
        manufacturer: Set(new.manufacturer),
        model: Set(new.model),
        serial_number: Set(new.serial_number),
        capacity: Set(new.capacity),
        resolution: Set(new.resolution),
        location: Set(new.location),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await
}

/// Certificates of a job request in issue order.
pub async fn list_certificates<C: ConnectionTrait>(
    conn: &C,
    job_request_id: i32,
) -> Result<Vec<certificate::Model>, DbErr> {
    certificate::Entity::find()
        .filter(certificate::Column::JobRequestId.eq(job_request_id))
        .order_by_asc(certificate::Column::Id)
        .all(conn)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::customer_repo::{self, NewCustomer};
    use crate::db::open_in_memory;
    use sea_orm::DatabaseConnection;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn test_db() -> (DatabaseConnection, job_request::Model) {
        let db = open_in_memory().await.expect("Failed to create test database");
        let customer = customer_repo::insert(
            &db,
            NewCustomer {
                name: "Acme".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let request = insert_job_request(
            &db,
            NewJobRequest {
                job_number: "ASC25/A051401".to_string(),
                date: date(2025, 5, 14),
                job_type: "ACCREDITED".to_string(),
                customer_id: customer.id,
                created_by: "frontdesk".to_string(),
                notifications_enabled: true,
            },
        )
        .await
        .unwrap();
        (db, request)
    }

    fn certificate(request: &job_request::Model, number: &str) -> NewCertificate {
        NewCertificate {
            job_request_id: request.id,
            certificate_number: number.to_string(),
            date_of_calibration: date(2025, 5, 14),
            calibration_due_date: date(2026, 5, 14),
            equipment_name: "Platform scale".to_string(),
            manufacturer: None,
            model: None,
            serial_number: Some("PS-1".to_string()),
            capacity: Some("300 kg".to_string()),
            resolution: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn test_find_job_request_with_customer() {
        let (db, request) = test_db().await;
        let (found, customer) = find_job_request_with_customer(&db, request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.job_number, "ASC25/A051401");
        assert_eq!(customer.unwrap().name, "Acme");
        assert!(find_job_request(&db, request.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_certificate_numbers_with_prefix() {
        let (db, request) = test_db().await;
        insert_certificate(&db, certificate(&request, "ASC25/A051401-01"))
            .await
            .unwrap();
        insert_certificate(&db, certificate(&request, "ASC25/A051401-02"))
            .await
            .unwrap();
        insert_certificate(&db, certificate(&request, "MANUAL-7"))
            .await
            .unwrap();

        let mut numbers = certificate_numbers_with_prefix(&db, request.id, &request.job_number)
            .await
            .unwrap();
        numbers.sort();
        assert_eq!(numbers, vec!["ASC25/A051401-01", "ASC25/A051401-02"]);
    }

    #[tokio::test]
    async fn test_duplicate_certificate_number_rejected() {
        let (db, request) = test_db().await;
        insert_certificate(&db, certificate(&request, "ASC25/A051401-01"))
            .await
            .unwrap();
        let result = insert_certificate(&db, certificate(&request, "ASC25/A051401-01")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_certificates_in_issue_order() {
        let (db, request) = test_db().await;
        for n in ["ASC25/A051401-02", "ASC25/A051401-01"] {
            insert_certificate(&db, certificate(&request, n)).await.unwrap();
        }
        let listed: Vec<String> = list_certificates(&db, request.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.certificate_number)
            .collect();
        assert_eq!(listed, vec!["ASC25/A051401-02", "ASC25/A051401-01"]);
    }
}
