//! Firestore integration tests.
//!
//! These hit a real Firestore project and are ignored by default; run
//! with `--ignored` and GCP credentials in the environment.

use jobboard_firestore::{ApplicationRepository, FirestoreClient, JobRepository};
use jobboard_models::{
    Application, Job, JobCategory, JobId, JobStatus, JobType, SalaryRange, WorkLocation,
    WorkplacePlane,
};

fn test_job(id: &str) -> Job {
    let now = chrono::Utc::now();
    Job {
        id: JobId::from_string(id),
        title: "Integration Test Engineer".to_string(),
        description: "Exercises the Firestore repositories end to end.".to_string(),
        job_type: JobType::Contract,
        experience_years: 1.0,
        category: JobCategory::Engineering,
        workplace_plane: WorkplacePlane::Remote,
        work_location: WorkLocation {
            city: "Pune".to_string(),
            state: "MH".to_string(),
            pincode: "411001".to_string(),
            area: "Baner".to_string(),
            street_address: "12 Main Rd".to_string(),
            country: "India".to_string(),
        },
        salary_range: Some(SalaryRange {
            min: 100_000.0,
            max: 200_000.0,
            currency: "INR".to_string(),
            frequency: "yearly".to_string(),
        }),
        skills: vec!["rust".to_string()],
        benefits: Vec::new(),
        company_id: "test_company_integration".to_string(),
        company_name: "Integration Co".to_string(),
        created_by: "test_recruiter_integration".to_string(),
        applications: Vec::new(),
        status: JobStatus::Open,
        number_of_positions: 1,
        posted_date: now,
        deadline: None,
        created_at: now,
        updated_at: now,
    }
}

/// Test Firestore connection.
#[tokio::test]
#[ignore = "requires Firestore credentials"]
async fn test_firestore_connection() {
    dotenvy::dotenv().ok();

    let client = FirestoreClient::from_env()
        .await
        .expect("Failed to create Firestore client");

    // A read of a missing document proves connectivity and auth
    let result = client.get_document("jobs", "_connection_check").await;
    assert!(result.expect("Firestore unreachable").is_none());
}

/// Test job repository create/read/save.
#[tokio::test]
#[ignore = "requires Firestore credentials"]
async fn test_job_repository_round_trip() {
    dotenvy::dotenv().ok();

    let client = FirestoreClient::from_env()
        .await
        .expect("Failed to create Firestore client");
    let repo = JobRepository::new(client);

    let job = test_job(&format!("itest-{}", uuid::Uuid::new_v4()));
    repo.create(&job).await.expect("Failed to create job");

    let stored = repo
        .get(&job.id)
        .await
        .expect("Failed to read job")
        .expect("Job missing after create");
    assert_eq!(stored.title, job.title);
    assert_eq!(stored.status, JobStatus::Open);

    // Clearing the salary range must delete the stored field
    let mut updated = stored;
    updated.salary_range = None;
    repo.save(&updated).await.expect("Failed to save job");

    let stored = repo
        .get(&job.id)
        .await
        .expect("Failed to re-read job")
        .expect("Job missing after save");
    assert!(stored.salary_range.is_none());
}

/// Test duplicate application rejection via the pair key.
#[tokio::test]
#[ignore = "requires Firestore credentials"]
async fn test_duplicate_application_create_conflicts() {
    dotenvy::dotenv().ok();

    let client = FirestoreClient::from_env()
        .await
        .expect("Failed to create Firestore client");
    let jobs = JobRepository::new(client.clone());
    let applications = ApplicationRepository::new(client);

    let job = test_job(&format!("itest-{}", uuid::Uuid::new_v4()));
    jobs.create(&job).await.expect("Failed to create job");

    let application = Application::new(
        job.id.clone(),
        "test_candidate_integration",
        "candidate@example.com",
    );
    applications
        .create(&application)
        .await
        .expect("First create should succeed");

    let second = applications.create(&application).await;
    assert!(second.is_err(), "Second create for the same pair must fail");

    jobs.append_application(&job.id, &application.id)
        .await
        .expect("Failed to append application reference");
    let stored = jobs
        .get(&job.id)
        .await
        .expect("Failed to read job")
        .expect("Job missing");
    assert!(stored.applications.contains(&application.id));
}
