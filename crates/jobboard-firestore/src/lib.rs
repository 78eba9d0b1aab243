//! Firestore REST API client for the JobBoard backend.
//!
//! This crate provides:
//! - A thin Firestore REST client with token caching and retry
//! - Typed repositories for Jobs, Applications and Companies
//! - Optimistic-concurrency updates for the Job applications array

pub mod application_repo;
pub mod client;
pub mod company_repo;
pub mod error;
pub mod job_repo;
pub mod metrics;
pub mod retry;
pub mod token_cache;
pub mod types;

pub use application_repo::ApplicationRepository;
pub use client::{FirestoreClient, FirestoreConfig};
pub use company_repo::{CompanyRecord, CompanyRepository};
pub use error::{FirestoreError, FirestoreResult};
pub use job_repo::JobRepository;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
