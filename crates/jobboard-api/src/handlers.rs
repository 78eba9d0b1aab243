//! HTTP request handlers.

pub mod applications;
pub mod health;
pub mod jobs;

pub use applications::{
    apply_job, get_applicants, get_application, get_applied_jobs, update_application_status,
};
pub use health::{health, liveness, readiness};
pub use jobs::{get_all_jobs, get_job, get_recruiter_jobs, post_job, search_jobs, update_job};
