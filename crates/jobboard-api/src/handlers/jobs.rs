//! Job posting handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use jobboard_firestore::{ApplicationRepository, CompanyRepository, JobRepository};
use jobboard_models::{Job, JobId, PostJobRequest, UpdateJobRequest, UserRole};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::search::{location_matches, paginate, SearchPage, SearchParams};
use crate::state::AppState;

#[derive(Serialize)]
pub struct JobMutationResponse {
    pub success: bool,
    pub message: String,
    pub job: Job,
}

#[derive(Serialize)]
pub struct JobListResponse {
    pub success: bool,
    pub jobs: Vec<Job>,
}

#[derive(Serialize)]
pub struct JobDetailResponse {
    pub success: bool,
    pub job: serde_json::Value,
}

/// POST /job/post
///
/// Recruiters post jobs under an approved company. The job goes live
/// (status Open) immediately.
pub async fn post_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<PostJobRequest>,
) -> ApiResult<(StatusCode, Json<JobMutationResponse>)> {
    user.require_job_manager()?;

    let validated = body.validate()?;

    let companies = CompanyRepository::new(state.firestore.as_ref().clone());
    let company = companies
        .get(&validated.company_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;
    if !company.is_approved() {
        return Err(ApiError::forbidden("Company is not approved to post jobs"));
    }

    let mut job = validated.into_job(&user.uid);
    // The company record is the source of truth for the display name
    if !company.name.trim().is_empty() {
        job.company_name = company.name.clone();
    }

    let jobs = JobRepository::new(state.firestore.as_ref().clone());
    jobs.create(&job).await?;

    metrics::record_job_posted(job.category.as_str());
    info!(job_id = %job.id, recruiter = %user.uid, "job posted");

    Ok((
        StatusCode::CREATED,
        Json(JobMutationResponse {
            success: true,
            message: "New job created successfully".to_string(),
            job,
        }),
    ))
}

/// GET /job/getadminjobs
///
/// Jobs posted by the calling recruiter, newest first. An empty board
/// is an empty list, not an error.
pub async fn get_recruiter_jobs(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<JobListResponse>> {
    user.require_job_manager()?;

    let jobs = JobRepository::new(state.firestore.as_ref().clone());
    let listed = jobs.list_by_creator(&user.uid).await?;

    Ok(Json(JobListResponse {
        success: true,
        jobs: listed,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    pub keyword: Option<String>,
    pub location: Option<String>,
}

fn keyword_matches(job: &Job, keyword: &str) -> bool {
    let keyword = keyword.to_lowercase();
    job.title.to_lowercase().contains(&keyword)
        || job.description.to_lowercase().contains(&keyword)
}

/// GET /job/get?keyword=&location=
///
/// Catalog browse for any authenticated caller. "all", blank or absent
/// filters match everything.
pub async fn get_all_jobs(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListJobsQuery>,
) -> ApiResult<Json<JobListResponse>> {
    let jobs = JobRepository::new(state.firestore.as_ref().clone());
    let mut listed = jobs.list_all().await?;

    if let Some(keyword) = query.keyword.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        listed.retain(|job| keyword_matches(job, keyword));
    }
    if let Some(location) = query
        .location
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
    {
        listed.retain(|job| location_matches(job, location));
    }

    Ok(Json(JobListResponse {
        success: true,
        jobs: listed,
    }))
}

/// GET /job/search
///
/// Filtered, paginated search over the catalog for any authenticated
/// caller.
pub async fn search_jobs(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchPage>> {
    let page = params.page;
    let limit = params.limit;
    let filters = params.into_filters()?;

    let jobs = JobRepository::new(state.firestore.as_ref().clone());
    let listed = jobs.list_all().await?;

    let now = Utc::now();
    let matched: Vec<Job> = listed
        .into_iter()
        .filter(|job| filters.matches(job, now))
        .collect();

    Ok(Json(paginate(matched, page, limit)))
}

/// GET /job/get/:id
///
/// Single job with its application back-references expanded into full
/// application records.
pub async fn get_job(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<JobDetailResponse>> {
    let job_id = JobId::from_string(id);

    let jobs = JobRepository::new(state.firestore.as_ref().clone());
    let job = jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let applications = ApplicationRepository::new(state.firestore.as_ref().clone());
    let expanded = applications.list_by_job(&job_id).await?;

    let mut job_json = serde_json::to_value(&job)
        .map_err(|e| ApiError::internal(format!("Failed to serialize job: {}", e)))?;
    job_json["applications"] = serde_json::to_value(&expanded)
        .map_err(|e| ApiError::internal(format!("Failed to serialize applications: {}", e)))?;

    Ok(Json(JobDetailResponse {
        success: true,
        job: job_json,
    }))
}

/// PUT /job/update/:id
///
/// Partial update by the posting recruiter (or an admin). Only
/// supplied, non-blank fields change; a body with nothing usable is a
/// client error.
pub async fn update_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateJobRequest>,
) -> ApiResult<Json<JobMutationResponse>> {
    user.require_job_manager()?;

    let job_id = JobId::from_string(id);
    let jobs = JobRepository::new(state.firestore.as_ref().clone());
    let existing = jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    if existing.created_by != user.uid && user.role != UserRole::Admin {
        return Err(ApiError::forbidden(
            "Only the recruiter who posted this job can update it",
        ));
    }

    let patch = body.validate(&existing)?;
    let updated = patch.apply(existing);
    jobs.save(&updated).await?;

    info!(job_id = %updated.id, recruiter = %user.uid, "job updated");

    Ok(Json(JobMutationResponse {
        success: true,
        message: "Job updated successfully".to_string(),
        job: updated,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobboard_models::{JobCategory, JobStatus, JobType, SalaryRange, WorkLocation, WorkplacePlane};

    fn sample_job(title: &str, description: &str, city: &str) -> Job {
        let now = Utc::now();
        Job {
            id: JobId::new(),
            title: title.to_string(),
            description: description.to_string(),
            job_type: JobType::FullTime,
            experience_years: 1.0,
            category: JobCategory::Engineering,
            workplace_plane: WorkplacePlane::OnSite,
            work_location: WorkLocation {
                city: city.to_string(),
                state: "MH".to_string(),
                pincode: "411001".to_string(),
                area: "Baner".to_string(),
                street_address: "12 Main Rd".to_string(),
                country: "India".to_string(),
            },
            salary_range: Some(SalaryRange {
                min: 300_000.0,
                max: 600_000.0,
                currency: "INR".to_string(),
                frequency: "yearly".to_string(),
            }),
            skills: vec!["rust".to_string()],
            benefits: Vec::new(),
            company_id: "comp-1".to_string(),
            company_name: "Acme".to_string(),
            created_by: "recruiter-1".to_string(),
            applications: Vec::new(),
            status: JobStatus::Open,
            number_of_positions: 1,
            posted_date: now,
            deadline: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn keyword_matches_title_or_description() {
        let job = sample_job("Backend Engineer", "Work on our Rust services", "Pune");
        assert!(keyword_matches(&job, "backend"));
        assert!(keyword_matches(&job, "RUST"));
        assert!(!keyword_matches(&job, "designer"));
    }

    #[test]
    fn location_match_is_case_insensitive() {
        let job = sample_job("Backend Engineer", "Work on our Rust services", "Pune");
        assert!(location_matches(&job, "pune"));
        assert!(location_matches(&job, "baner"));
        assert!(!location_matches(&job, "mumbai"));
    }
}
