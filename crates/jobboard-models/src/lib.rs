//! Shared data models for the JobBoard backend.
//!
//! This crate provides Serde-serializable types for:
//! - Job postings and their lifecycle status
//! - Applications and their pair-keyed identity
//! - Typed input DTOs with parse-and-validate coercion
//! - User roles read from auth claims

pub mod application;
pub mod input;
pub mod job;
pub mod user;

// Re-export common types
pub use application::{Application, ApplicationId, INITIAL_APPLICATION_STATUS};
pub use input::{
    ApplyRequest, JobPatch, PostJobRequest, SalaryPatch, UpdateJobRequest, UpdateStatusRequest,
    ValidatedJob, ValidationError,
};
pub use job::{
    Job, JobCategory, JobId, JobStatus, JobType, SalaryRange, WorkLocation, WorkplacePlane,
};
pub use user::UserRole;
