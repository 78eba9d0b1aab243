//! Application lifecycle handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use jobboard_firestore::{ApplicationRepository, FirestoreError, JobRepository};
use jobboard_models::{
    Application, ApplicationId, ApplyRequest, Job, JobId, UpdateStatusRequest, UserRole,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApplicationResponse {
    pub success: bool,
    pub application: Application,
}

#[derive(Serialize)]
pub struct AppliedJobsResponse {
    pub success: bool,
    pub application: Vec<serde_json::Value>,
}

#[derive(Serialize)]
pub struct ApplicantsResponse {
    pub success: bool,
    pub job: serde_json::Value,
}

const ALREADY_APPLIED: &str = "You have already applied to this job";

/// POST /application/apply/:id
///
/// A candidate applies to a job. The application id is the
/// deterministic (job, applicant) pair key, so a concurrent second
/// apply loses the document create instead of slipping through.
pub async fn apply_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<ApplyRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    user.require_candidate()?;
    let email = body.validated_email()?;

    let job_id = JobId::from_string(id);
    let jobs = JobRepository::new(state.firestore.as_ref().clone());
    let job = jobs
        .get(&job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    if !job.is_open() {
        return Err(ApiError::bad_request(
            "This job is no longer accepting applications",
        ));
    }

    let applications = ApplicationRepository::new(state.firestore.as_ref().clone());
    let application = Application::new(job_id.clone(), user.uid.as_str(), email.as_str());

    // Legacy ordering notified before the duplicate check; default is
    // to notify only once the application is actually on file.
    if state.config.notify_before_create {
        state
            .mailer
            .notify_application_submitted(&email, &job.title)
            .await;
    }

    if applications.get(&application.id).await?.is_some() {
        metrics::record_duplicate_application();
        return Err(ApiError::bad_request(ALREADY_APPLIED));
    }

    match applications.create(&application).await {
        Ok(()) => {}
        Err(FirestoreError::AlreadyExists(_)) => {
            // Lost the race to a concurrent apply from the same user
            metrics::record_duplicate_application();
            return Err(ApiError::bad_request(ALREADY_APPLIED));
        }
        Err(e) => return Err(e.into()),
    }

    jobs.append_application(&job_id, &application.id).await?;

    if !state.config.notify_before_create {
        state
            .mailer
            .notify_application_submitted(&email, &job.title)
            .await;
    }

    metrics::record_application_submitted();
    info!(application_id = %application.id, candidate = %user.uid, "application submitted");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            success: true,
            message: "Application submitted successfully".to_string(),
        }),
    ))
}

fn expand_application(application: &Application, job: Option<&Job>) -> serde_json::Value {
    let mut value = serde_json::to_value(application).unwrap_or_else(|_| json!({}));
    value["job"] = match job {
        Some(job) => serde_json::to_value(job).unwrap_or(serde_json::Value::Null),
        None => serde_json::Value::Null,
    };
    value
}

/// GET /application/get
///
/// The calling candidate's applications, newest first, each expanded
/// with the job it targets. Applications whose job has since been
/// deleted carry a null job.
pub async fn get_applied_jobs(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<AppliedJobsResponse>> {
    user.require_candidate()?;

    let applications = ApplicationRepository::new(state.firestore.as_ref().clone());
    let jobs = JobRepository::new(state.firestore.as_ref().clone());

    let mine = applications.list_by_applicant(&user.uid).await?;

    let mut expanded = Vec::with_capacity(mine.len());
    for application in &mine {
        let job = jobs.get(&application.job_id).await?;
        expanded.push(expand_application(application, job.as_ref()));
    }

    Ok(Json(AppliedJobsResponse {
        success: true,
        application: expanded,
    }))
}

async fn load_owned_job(
    jobs: &JobRepository,
    job_id: &JobId,
    user: &AuthUser,
) -> ApiResult<Job> {
    let job = jobs
        .get(job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    if job.created_by != user.uid && user.role != UserRole::Admin {
        return Err(ApiError::forbidden(
            "Only the recruiter who posted this job can view its applicants",
        ));
    }
    Ok(job)
}

/// GET /application/:id/applicants
///
/// The job with every application against it expanded, for the
/// recruiter who posted it.
pub async fn get_applicants(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApplicantsResponse>> {
    user.require_job_manager()?;

    let job_id = JobId::from_string(id);
    let jobs = JobRepository::new(state.firestore.as_ref().clone());
    let job = load_owned_job(&jobs, &job_id, &user).await?;

    let applications = ApplicationRepository::new(state.firestore.as_ref().clone());
    let expanded = applications.list_by_job(&job_id).await?;

    let mut job_json = serde_json::to_value(&job)
        .map_err(|e| ApiError::internal(format!("Failed to serialize job: {}", e)))?;
    job_json["applications"] = serde_json::to_value(&expanded)
        .map_err(|e| ApiError::internal(format!("Failed to serialize applications: {}", e)))?;

    Ok(Json(ApplicantsResponse {
        success: true,
        job: job_json,
    }))
}

/// GET /application/:id
///
/// A single application. Visible to its candidate, the recruiter who
/// posted the job, and admins.
pub async fn get_application(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ApplicationResponse>> {
    let application_id = ApplicationId::from_string(id);
    let applications = ApplicationRepository::new(state.firestore.as_ref().clone());
    let application = applications
        .get(&application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    if application.applicant_uid != user.uid && user.role != UserRole::Admin {
        user.require_job_manager()?;
        let jobs = JobRepository::new(state.firestore.as_ref().clone());
        load_owned_job(&jobs, &application.job_id, &user).await?;
    }

    Ok(Json(ApplicationResponse {
        success: true,
        application,
    }))
}

/// POST /application/status/:id/update
///
/// Recruiter moves an application through its pipeline. The status is
/// lower-cased but otherwise free-form.
pub async fn update_application_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    user.require_job_manager()?;
    let status = body.validated_status()?;

    let application_id = ApplicationId::from_string(id);
    let applications = ApplicationRepository::new(state.firestore.as_ref().clone());
    let application = applications
        .get(&application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let jobs = JobRepository::new(state.firestore.as_ref().clone());
    load_owned_job(&jobs, &application.job_id, &user).await?;

    applications.update_status(&application_id, &status).await?;

    info!(application_id = %application_id, status = %status, "application status updated");

    Ok(Json(MessageResponse {
        success: true,
        message: "Application status updated successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expanded_application_carries_job_or_null() {
        let application =
            Application::new(JobId::from_string("job-1"), "user-9", "u9@example.com");

        let value = expand_application(&application, None);
        assert!(value["job"].is_null());
        assert_eq!(value["status"], "pending");
        assert_eq!(value["id"], "job-1_user-9");
    }
}
