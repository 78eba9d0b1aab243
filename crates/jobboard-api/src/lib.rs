//! HTTP API for the job board backend.
//!
//! Exposes the recruiter job-management surface and the candidate
//! application surface over the Firestore-backed repositories.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod search;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
