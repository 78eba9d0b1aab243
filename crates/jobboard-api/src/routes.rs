//! Route table and middleware stack.

use std::sync::Arc;

use axum::middleware as axum_middleware;
use axum::routing::{get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::handlers;
use crate::metrics;
use crate::middleware::{self, RateLimiterCache};
use crate::state::AppState;

/// Build the application router.
///
/// Probes and the metrics scrape endpoint sit outside the rate limiter;
/// everything else is per-IP limited.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let rate_limiter = Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .route("/job/post", post(handlers::post_job))
        .route("/job/getadminjobs", get(handlers::get_recruiter_jobs))
        .route("/job/get", get(handlers::get_all_jobs))
        .route("/job/get/:id", get(handlers::get_job))
        .route("/job/search", get(handlers::search_jobs))
        .route("/job/update/:id", put(handlers::update_job))
        .route("/application/apply/:id", post(handlers::apply_job))
        .route("/application/get", get(handlers::get_applied_jobs))
        .route("/application/:id/applicants", get(handlers::get_applicants))
        .route("/application/:id", get(handlers::get_application))
        .route(
            "/application/status/:id/update",
            post(handlers::update_application_status),
        )
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&rate_limiter),
            middleware::rate_limit_middleware,
        ));

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .route("/healthz", get(handlers::liveness))
        .route("/ready", get(handlers::readiness))
        .merge(api_routes);

    if let Some(handle) = metrics_handle {
        router = router.route(
            "/metrics",
            get(move || {
                let handle = handle.clone();
                async move { handle.render() }
            }),
        );
    }

    router
        .layer(axum_middleware::from_fn(metrics::metrics_middleware))
        .layer(axum_middleware::from_fn(middleware::request_logging))
        .layer(axum_middleware::from_fn(middleware::request_id))
        .layer(axum_middleware::from_fn(middleware::security_headers))
        .layer(middleware::cors_layer(&state.config.cors_origins))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .with_state(state)
}
