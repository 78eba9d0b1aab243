//! Application model.
//!
//! An application expresses a candidate's interest in a specific job. Its
//! identity is the deterministic pair key `{job_id}_{applicant_uid}` so the
//! document store itself rejects duplicate applications on create.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::job::JobId;

/// Status assigned to a freshly created application.
pub const INITIAL_APPLICATION_STATUS: &str = "pending";

/// Pair-keyed identifier for an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl ApplicationId {
    /// Build the deterministic id for a (job, applicant) pair.
    pub fn for_pair(job_id: &JobId, applicant_uid: &str) -> Self {
        Self(format!("{}_{}", job_id.as_str(), applicant_uid))
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate's application to a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant_uid: String,
    pub applicant_email: String,

    /// Lower-cased free-form status. Clients use "pending", "accepted" and
    /// "rejected"; the backend does not enforce a whitelist.
    pub status: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Create a new pending application.
    pub fn new(
        job_id: JobId,
        applicant_uid: impl Into<String>,
        applicant_email: impl Into<String>,
    ) -> Self {
        let applicant_uid = applicant_uid.into();
        let now = Utc::now();
        Self {
            id: ApplicationId::for_pair(&job_id, &applicant_uid),
            job_id,
            applicant_uid,
            applicant_email: applicant_email.into(),
            status: INITIAL_APPLICATION_STATUS.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a status update, lower-casing the supplied value.
    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_lowercase();
        self.updated_at = Utc::now();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key() {
        let job = JobId::from_string("job-1");
        let id = ApplicationId::for_pair(&job, "user-9");
        assert_eq!(id.as_str(), "job-1_user-9");
    }

    #[test]
    fn test_new_application_is_pending() {
        let app = Application::new(JobId::from_string("j"), "u", "u@example.com");
        assert_eq!(app.status, "pending");
        assert_eq!(app.id.as_str(), "j_u");
    }

    #[test]
    fn test_status_is_lowercased() {
        let app = Application::new(JobId::from_string("j"), "u", "u@example.com");
        let app = app.with_status("REJECTED");
        assert_eq!(app.status, "rejected");
    }
}
