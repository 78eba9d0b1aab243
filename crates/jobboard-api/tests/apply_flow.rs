//! End-to-end tests for the candidate apply flow.
//!
//! The router runs against a wiremock server standing in for the
//! Firestore emulator, so every Firestore read and write the flow
//! performs is asserted without real credentials.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jobboard_api::auth::Claims;
use jobboard_api::services::Mailer;
use jobboard_api::{create_router, ApiConfig, AppState};
use jobboard_firestore::retry::RetryConfig;
use jobboard_firestore::{FirestoreClient, FirestoreConfig};

const PROJECT: &str = "test-project";
const DOCS: &str = "/v1/projects/test-project/databases/(default)/documents";
const SECRET: &str = "integration-test-secret";

async fn build_router_with_relay(
    firestore: &MockServer,
    relay_url: Option<String>,
    notify_before_create: bool,
) -> Router {
    let host = firestore
        .uri()
        .strip_prefix("http://")
        .expect("mock server uri")
        .to_string();

    let client = FirestoreClient::new(FirestoreConfig {
        project_id: PROJECT.to_string(),
        database_id: "(default)".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        retry: RetryConfig {
            max_retries: 0,
            base_delay_ms: 1,
            max_delay_ms: 1,
        },
        emulator_host: Some(host),
    })
    .await
    .expect("emulator client");

    let config = ApiConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        rate_limit_rps: 100,
        request_timeout: Duration::from_secs(5),
        max_body_size: 1024 * 1024,
        environment: "test".to_string(),
        jwt_secret: SECRET.to_string(),
        mail_relay_url: relay_url.clone(),
        notify_before_create,
    };

    let state = AppState {
        config,
        firestore: Arc::new(client),
        mailer: Arc::new(Mailer::new(relay_url).unwrap()),
    };

    create_router(state, None)
}

fn bearer(role: &str, uid: &str, email: &str) -> String {
    let claims = Claims {
        sub: uid.to_string(),
        role: role.to_string(),
        email: email.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();
    format!("Bearer {}", token)
}

fn open_job_document() -> serde_json::Value {
    job_document("Open")
}

fn job_document(status: &str) -> serde_json::Value {
    serde_json::json!({
        "name": format!("projects/{}/databases/(default)/documents/jobs/job-1", PROJECT),
        "fields": {
            "title": {"stringValue": "Backend Engineer"},
            "description": {"stringValue": "Own the document store backed APIs"},
            "job_type": {"stringValue": "Full-Time"},
            "experience_years": {"doubleValue": 3.0},
            "status": {"stringValue": status},
            "work_location": {"mapValue": {"fields": {
                "city": {"stringValue": "Pune"},
                "state": {"stringValue": "Maharashtra"},
                "pincode": {"stringValue": "411001"},
                "area": {"stringValue": "Baner"},
                "street_address": {"stringValue": "1 Main Street"},
                "country": {"stringValue": "India"}
            }}},
            "applications": {"arrayValue": {"values": []}}
        },
        "updateTime": "2026-01-01T00:00:00.000000Z"
    })
}

fn apply_request(job_id: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/application/apply/{}", job_id))
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = authorization {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder
        .body(Body::from(r#"{"email":"cand@example.com"}"#))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn apply_creates_application_and_notifies_after_create() {
    let firestore = MockServer::start().await;
    let relay = MockServer::start().await;

    // Job fetched once by the handler and once by the applications append
    Mock::given(method("GET"))
        .and(path(format!("{}/jobs/job-1", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_job_document()))
        .expect(2)
        .mount(&firestore)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/applications/job-1_user-1", DOCS)))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&firestore)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{}/applications", DOCS)))
        .and(query_param("documentId", "job-1_user-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": format!("projects/{}/databases/(default)/documents/applications/job-1_user-1", PROJECT),
            "fields": {}
        })))
        .expect(1)
        .mount(&firestore)
        .await;

    Mock::given(method("PATCH"))
        .and(path(format!("{}/jobs/job-1", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": format!("projects/{}/databases/(default)/documents/jobs/job-1", PROJECT),
            "fields": {}
        })))
        .expect(1)
        .mount(&firestore)
        .await;

    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&relay)
        .await;

    let router = build_router_with_relay(&firestore, Some(format!("{}/send", relay.uri())), false).await;
    let token = bearer("candidate", "user-1", "cand@example.com");
    let response = router.oneshot(apply_request("job-1", Some(token.as_str()))).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], serde_json::json!(true));
}

#[tokio::test]
async fn duplicate_application_is_rejected_without_notification() {
    let firestore = MockServer::start().await;
    let relay = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/jobs/job-1", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_job_document()))
        .expect(1)
        .mount(&firestore)
        .await;

    // The pair-key record already exists
    Mock::given(method("GET"))
        .and(path(format!("{}/applications/job-1_user-1", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": format!("projects/{}/databases/(default)/documents/applications/job-1_user-1", PROJECT),
            "fields": {}
        })))
        .expect(1)
        .mount(&firestore)
        .await;

    // Default ordering: no mail for a rejected duplicate
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&relay)
        .await;

    let router = build_router_with_relay(&firestore, Some(format!("{}/send", relay.uri())), false).await;
    let token = bearer("candidate", "user-1", "cand@example.com");
    let response = router.oneshot(apply_request("job-1", Some(token.as_str()))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        serde_json::json!("You have already applied to this job")
    );
}

#[tokio::test]
async fn lost_create_race_reports_duplicate() {
    let firestore = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/jobs/job-1", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_job_document()))
        .expect(1)
        .mount(&firestore)
        .await;

    // Pre-check sees nothing, but a concurrent apply wins the create
    Mock::given(method("GET"))
        .and(path(format!("{}/applications/job-1_user-1", DOCS)))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&firestore)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{}/applications", DOCS)))
        .respond_with(ResponseTemplate::new(409).set_body_string(
            r#"{"error":{"status":"ALREADY_EXISTS","message":"Document already exists"}}"#,
        ))
        .expect(1)
        .mount(&firestore)
        .await;

    let router = build_router_with_relay(&firestore, None, false).await;
    let token = bearer("candidate", "user-1", "cand@example.com");
    let response = router.oneshot(apply_request("job-1", Some(token.as_str()))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        serde_json::json!("You have already applied to this job")
    );
}

#[tokio::test]
async fn legacy_ordering_notifies_even_for_duplicates() {
    let firestore = MockServer::start().await;
    let relay = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/jobs/job-1", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(open_job_document()))
        .expect(1)
        .mount(&firestore)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}/applications/job-1_user-1", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": format!("projects/{}/databases/(default)/documents/applications/job-1_user-1", PROJECT),
            "fields": {}
        })))
        .expect(1)
        .mount(&firestore)
        .await;

    // Legacy ordering mails before the duplicate check runs
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&relay)
        .await;

    let router = build_router_with_relay(&firestore, Some(format!("{}/send", relay.uri())), true).await;
    let token = bearer("candidate", "user-1", "cand@example.com");
    let response = router.oneshot(apply_request("job-1", Some(token.as_str()))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn closed_job_rejects_new_applications() {
    let firestore = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/jobs/job-1", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(job_document("Closed")))
        .expect(1)
        .mount(&firestore)
        .await;

    let router = build_router_with_relay(&firestore, None, false).await;
    let token = bearer("candidate", "user-1", "cand@example.com");
    let response = router.oneshot(apply_request("job-1", Some(token.as_str()))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        serde_json::json!("This job is no longer accepting applications")
    );
}

#[tokio::test]
async fn catalog_browse_requires_bearer_token() {
    let firestore = MockServer::start().await;

    let router = build_router_with_relay(&firestore, None, false).await;
    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/job/get")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn catalog_browse_is_open_to_any_authenticated_role() {
    let firestore = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{}:runQuery", DOCS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&firestore)
        .await;

    let router = build_router_with_relay(&firestore, None, false).await;
    let token = bearer("candidate", "user-1", "cand@example.com");
    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/job/get")
                .header(header::AUTHORIZATION, token.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], serde_json::json!(true));
    assert_eq!(body["jobs"], serde_json::json!([]));
}
