//! Prometheus metrics for the API server.

use std::sync::OnceLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use regex::Regex;

/// Initialize the Prometheus metrics recorder.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "jobboard_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "jobboard_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "jobboard_http_requests_in_flight";

    pub const JOBS_POSTED_TOTAL: &str = "jobboard_jobs_posted_total";
    pub const APPLICATIONS_SUBMITTED_TOTAL: &str = "jobboard_applications_submitted_total";
    pub const DUPLICATE_APPLICATIONS_TOTAL: &str = "jobboard_duplicate_applications_total";

    pub const RATE_LIMIT_HITS_TOTAL: &str = "jobboard_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a posted job.
pub fn record_job_posted(category: &str) {
    let labels = [("category", category.to_string())];
    counter!(names::JOBS_POSTED_TOTAL, &labels).increment(1);
}

/// Record a submitted application.
pub fn record_application_submitted() {
    counter!(names::APPLICATIONS_SUBMITTED_TOTAL).increment(1);
}

/// Record a rejected duplicate application.
pub fn record_duplicate_application() {
    counter!(names::DUPLICATE_APPLICATIONS_TOTAL).increment(1);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

fn uuid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
            .expect("valid uuid pattern")
    })
}

fn pair_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Application pair ids: "{job_uuid}_{uid}"
    RE.get_or_init(|| Regex::new(r"/application/:id_[A-Za-z0-9_-]+").expect("valid pair pattern"))
}

/// Sanitize path for metrics labels so ids do not explode cardinality.
fn sanitize_path(path: &str) -> String {
    let path = uuid_re().replace_all(path, ":id");
    let path = pair_id_re().replace_all(&path, "/application/:id");
    path.to_string()
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();
    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_job_path() {
        assert_eq!(
            sanitize_path("/job/get/550e8400-e29b-41d4-a716-446655440000"),
            "/job/get/:id"
        );
    }

    #[test]
    fn test_sanitize_application_pair_path() {
        assert_eq!(
            sanitize_path("/application/550e8400-e29b-41d4-a716-446655440000_user-9"),
            "/application/:id"
        );
    }

    #[test]
    fn test_static_paths_untouched() {
        assert_eq!(sanitize_path("/job/getadminjobs"), "/job/getadminjobs");
    }
}
