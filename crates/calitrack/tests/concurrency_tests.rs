//! Concurrent units of work against a file-backed database.

mod common;

use calitrack::config::DatabaseConfig;
use calitrack::workflow::inputs::{CreateJobInput, CustomerInput, JobRequestInput};
use calitrack::{init_database, JobWorkflow, WorkflowSettings};
use common::{date, CALLER};
use tempfile::TempDir;

const CALLS: usize = 8;

async fn file_backed_workflow(dir: &TempDir) -> (JobWorkflow, i32) {
    let config = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", dir.path().join("jobs.db").display()),
        max_connections: CALLS as u32,
        ..DatabaseConfig::default()
    };
    let db = init_database(&config)
        .await
        .expect("Failed to open file database");
    let workflow = JobWorkflow::new(db, WorkflowSettings::default());
    let customer = workflow
        .create_customer(CustomerInput {
            name: Some("Acme Weighing".to_string()),
            ..Default::default()
        })
        .await
        .expect("Failed to seed customer");
    (workflow, customer.id)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_job_requests_get_distinct_numbers() {
    let dir = TempDir::new().unwrap();
    let (workflow, customer_id) = file_backed_workflow(&dir).await;

    let handles: Vec<_> = (0..CALLS)
        .map(|_| {
            let workflow = workflow.clone();
            tokio::spawn(async move {
                workflow
                    .generate_job_request(
                        JobRequestInput {
                            job_type: Some("ACCREDITED".to_string()),
                            date: Some(date(2025, 5, 14)),
                            customer_id: Some(customer_id),
                            notifications_enabled: None,
                        },
                        CALLER,
                    )
                    .await
            })
        })
        .collect();

    let mut numbers = Vec::new();
    for handle in handles {
        let request = handle.await.unwrap().expect("job request should be issued");
        numbers.push(request.job_number);
    }
    numbers.sort();

    let expected: Vec<String> = (1..=CALLS)
        .map(|n| format!("ASC25/A0514{:02}", n))
        .collect();
    assert_eq!(numbers, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_job_intake_gets_distinct_numbers() {
    let dir = TempDir::new().unwrap();
    let (workflow, customer_id) = file_backed_workflow(&dir).await;

    let handles: Vec<_> = (0..CALLS)
        .map(|_| {
            let workflow = workflow.clone();
            tokio::spawn(async move {
                workflow
                    .create_job(
                        CreateJobInput {
                            customer_id: Some(customer_id),
                            ..Default::default()
                        },
                        CALLER,
                    )
                    .await
            })
        })
        .collect();

    let mut suffixes = Vec::new();
    for handle in handles {
        let job = handle.await.unwrap().expect("job should be created");
        suffixes.push(job.job_number[8..].to_string());
    }
    suffixes.sort();

    let expected: Vec<String> = (1..=CALLS).map(|n| format!("{:04}", n)).collect();
    assert_eq!(suffixes, expected);
}
