//! HTTP tests against a server bound to an ephemeral port.

use std::collections::HashMap;
use std::sync::Arc;

use calitrack::db::open_in_memory;
use calitrack::{JobWorkflow, WorkflowSettings};
use calitrack_server::{router, ServerState};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

const TOKEN: &str = "test-token";

struct TestServer {
    base: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        let db = open_in_memory().await.expect("database");
        let workflow = JobWorkflow::new(db, WorkflowSettings::default());
        let tokens = HashMap::from([(TOKEN.to_string(), "frontdesk".to_string())]);
        let app = router(Arc::new(ServerState::new(workflow, tokens)));

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server");
        });

        Self {
            base: format!("http://{}", addr),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self
            .client
            .request(method, self.url(path))
            .bearer_auth(TOKEN);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.expect("request");
        let status = response.status();
        let body = response.json::<Value>().await.expect("json body");
        (status, body)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(reqwest::Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(reqwest::Method::PUT, path, Some(body)).await
    }

    async fn create_customer(&self) -> i64 {
        let (status, body) = self
            .post("/customers", json!({ "name": "Acme Weighing" }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_i64().expect("customer id")
    }

    async fn create_job(&self, customer_id: i64) -> i64 {
        let (status, body) = self
            .post(
                "/jobs",
                json!({ "customer_id": customer_id, "make": "Avery", "serial_number": "SN-1" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "pending_inspection");
        body["data"]["jobId"].as_i64().expect("job id")
    }

    async fn inspect(&self, job_id: i64) {
        let (status, _) = self
            .post(
                "/jobs/inspections",
                json!({
                    "job_id": job_id,
                    "problems_found": "Indicator drift",
                    "inspected_by": "tech",
                    "inspection_date": "2025-05-02",
                    "spare_parts": [
                        { "part_name": "Load cell", "quantity": 1, "unit_price": 180.0 }
                    ]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

fn quotation(job_id: i64, number: &str) -> Value {
    json!({
        "job_id": job_id,
        "quotation_number": number,
        "quotation_date": "2025-05-03",
        "amount": 180.0
    })
}

#[tokio::test]
async fn test_requests_need_a_known_token() {
    let server = TestServer::start().await;

    let response = server
        .client
        .get(server.url("/jobs"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);

    let response = server
        .client
        .get(server.url("/jobs"))
        .bearer_auth("nope")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_job_moves_through_every_stage() {
    let server = TestServer::start().await;
    let customer_id = server.create_customer().await;
    let job_id = server.create_job(customer_id).await;

    server.inspect(job_id).await;
    let (_, job) = server.get(&format!("/jobs/{}", job_id)).await;
    assert_eq!(job["data"]["status"], "pending_quotation");
    assert_eq!(job["data"]["spare_parts"].as_array().unwrap().len(), 1);

    let (status, _) = server.post("/quotations", quotation(job_id, "QT-1")).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, approval) = server
        .post(
            "/approvals",
            json!({ "job_id": job_id, "lpo_number": "LPO-9", "approval_date": "2025-05-05" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(approval["data"]["status"], "approved");
    assert_eq!(approval["data"]["record"]["prepared_by"], "frontdesk");
    let approval_id = approval["data"]["record"]["id"].as_i64().unwrap();

    let response = server
        .client
        .put(server.url(&format!("/approvals/{}/ready", approval_id)))
        .bearer_auth(TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let ready: Value = response.json().await.unwrap();
    assert_eq!(ready["data"]["status"], "ready_for_delivery");

    let (status, delivered) = server
        .put(
            &format!("/jobs/{}/delivery", job_id),
            json!({
                "invoice_number": "INV-1",
                "invoice_amount": 180.0,
                "invoice_date": "2025-05-10",
                "status": "completed"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(delivered["data"]["status"], "completed");

    let (_, job) = server.get(&format!("/jobs/{}", job_id)).await;
    assert_eq!(job["data"]["status"], "completed");
    assert_eq!(job["data"]["invoice_number"], "INV-1");
    assert_eq!(job["data"]["lpo_number"], "LPO-9");
    assert_eq!(job["data"]["customer_name"], "Acme Weighing");

    let (_, summary) = server.get("/jobs/summary").await;
    assert_eq!(summary["data"]["completed"], 1);
    assert_eq!(summary["data"]["total"], 1);

    let (_, listed) = server.get("/jobs?status=completed").await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_bad_requests() {
    let server = TestServer::start().await;
    let customer_id = server.create_customer().await;
    let job_id = server.create_job(customer_id).await;

    let (status, body) = server
        .post("/jobs/inspections", json!({ "job_id": job_id }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let response = server
        .client
        .post(server.url("/customers"))
        .bearer_auth(TOKEN)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _) = server.get("/jobs?status=lost").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server.get("/jobs/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_illegal_and_duplicate_transitions_conflict() {
    let server = TestServer::start().await;
    let customer_id = server.create_customer().await;
    let first = server.create_job(customer_id).await;
    let second = server.create_job(customer_id).await;

    let (status, body) = server
        .send(
            reqwest::Method::PATCH,
            &format!("/jobs/{}/status", first),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("pending_inspection"));

    server.inspect(first).await;
    server.inspect(second).await;
    let (status, _) = server.post("/quotations", quotation(first, "QT-1")).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = server.post("/quotations", quotation(second, "QT-1")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = server.post("/quotations", quotation(first, "QT-1")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, job) = server.get(&format!("/jobs/{}", second)).await;
    assert_eq!(job["data"]["status"], "pending_quotation");
}

#[tokio::test]
async fn test_job_requests_and_certificates() {
    let server = TestServer::start().await;
    let customer_id = server.create_customer().await;

    let (status, request) = server
        .post(
            "/job-requests/generate",
            json!({ "jobType": "NON-ACCREDITED", "date": "2025-05-14", "customerId": customer_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["data"]["job_number"], "ASC25/051401");
    let request_id = request["data"]["id"].as_i64().unwrap();

    for expected in ["ASC25/051401-01", "ASC25/051401-02"] {
        let (status, certificate) = server
            .post(
                "/certificates",
                json!({
                    "job_request_id": request_id,
                    "date_of_calibration": "2025-05-14",
                    "equipment_name": "Bench scale"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(certificate["data"]["certificate_number"], expected);
        assert_eq!(certificate["data"]["calibration_due_date"], "2026-05-14");
    }

    let (_, listed) = server
        .get(&format!("/job-requests/{}/certificates", request_id))
        .await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 2);

    let (status, _) = server.get("/job-requests/404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
