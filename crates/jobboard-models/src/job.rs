//! Job posting model and lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::application::ApplicationId;

/// Unique identifier for a job posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a job posting.
///
/// The model defaults to Draft, but the create handler posts jobs as Open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JobStatus {
    Open,
    Closed,
    #[default]
    Draft,
    Expired,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "Open",
            JobStatus::Closed => "Closed",
            JobStatus::Draft => "Draft",
            JobStatus::Expired => "Expired",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(JobStatus::Open),
            "Closed" => Some(JobStatus::Closed),
            "Draft" => Some(JobStatus::Draft),
            "Expired" => Some(JobStatus::Expired),
            _ => None,
        }
    }

    /// Closed and Expired jobs accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Closed | JobStatus::Expired)
    }
}

/// Employment arrangement of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Full-Time")]
    FullTime,
    #[serde(rename = "Part-Time")]
    PartTime,
    Contract,
    Temporary,
    Internship,
    Freelance,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-Time",
            JobType::PartTime => "Part-Time",
            JobType::Contract => "Contract",
            JobType::Temporary => "Temporary",
            JobType::Internship => "Internship",
            JobType::Freelance => "Freelance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Full-Time" => Some(JobType::FullTime),
            "Part-Time" => Some(JobType::PartTime),
            "Contract" => Some(JobType::Contract),
            "Temporary" => Some(JobType::Temporary),
            "Internship" => Some(JobType::Internship),
            "Freelance" => Some(JobType::Freelance),
            _ => None,
        }
    }
}

/// Industry category of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum JobCategory {
    Engineering,
    Design,
    Marketing,
    Sales,
    Finance,
    #[serde(rename = "Human Resources")]
    HumanResources,
    Operations,
    #[serde(rename = "Customer Support")]
    CustomerSupport,
    Legal,
    Healthcare,
    Education,
    #[default]
    Other,
}

impl JobCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobCategory::Engineering => "Engineering",
            JobCategory::Design => "Design",
            JobCategory::Marketing => "Marketing",
            JobCategory::Sales => "Sales",
            JobCategory::Finance => "Finance",
            JobCategory::HumanResources => "Human Resources",
            JobCategory::Operations => "Operations",
            JobCategory::CustomerSupport => "Customer Support",
            JobCategory::Legal => "Legal",
            JobCategory::Healthcare => "Healthcare",
            JobCategory::Education => "Education",
            JobCategory::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Engineering" => Some(JobCategory::Engineering),
            "Design" => Some(JobCategory::Design),
            "Marketing" => Some(JobCategory::Marketing),
            "Sales" => Some(JobCategory::Sales),
            "Finance" => Some(JobCategory::Finance),
            "Human Resources" => Some(JobCategory::HumanResources),
            "Operations" => Some(JobCategory::Operations),
            "Customer Support" => Some(JobCategory::CustomerSupport),
            "Legal" => Some(JobCategory::Legal),
            "Healthcare" => Some(JobCategory::Healthcare),
            "Education" => Some(JobCategory::Education),
            "Other" => Some(JobCategory::Other),
            _ => None,
        }
    }
}

/// Work arrangement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WorkplacePlane {
    Remote,
    #[default]
    #[serde(rename = "On-site")]
    OnSite,
    Hybrid,
}

impl WorkplacePlane {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkplacePlane::Remote => "Remote",
            WorkplacePlane::OnSite => "On-site",
            WorkplacePlane::Hybrid => "Hybrid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Remote" => Some(WorkplacePlane::Remote),
            "On-site" => Some(WorkplacePlane::OnSite),
            "Hybrid" => Some(WorkplacePlane::Hybrid),
            _ => None,
        }
    }
}

/// Structured work location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkLocation {
    pub city: String,
    pub state: String,
    /// Exactly six digits.
    pub pincode: String,
    pub area: String,
    pub street_address: String,
    #[serde(default = "default_country")]
    pub country: String,
}

pub(crate) fn default_country() -> String {
    "India".to_string()
}

/// Compensation range offered for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_frequency")]
    pub frequency: String,
}

pub(crate) fn default_currency() -> String {
    "INR".to_string()
}

pub(crate) fn default_frequency() -> String {
    "yearly".to_string()
}

/// A posted position owned by a recruiter and a company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,

    pub title: String,
    pub description: String,
    pub job_type: JobType,

    /// Years of experience required, parsed from a decimal string like "2.5".
    pub experience_years: f64,

    #[serde(default)]
    pub category: JobCategory,

    #[serde(default)]
    pub workplace_plane: WorkplacePlane,

    pub work_location: WorkLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<SalaryRange>,

    /// Required, non-empty after input parsing.
    pub skills: Vec<String>,

    #[serde(default)]
    pub benefits: Vec<String>,

    pub company_id: String,
    pub company_name: String,

    /// Recruiter uid that owns this posting.
    pub created_by: String,

    /// Denormalized back-references; the Application collection is the
    /// source of truth.
    #[serde(default)]
    pub applications: Vec<ApplicationId>,

    #[serde(default)]
    pub status: JobStatus,

    pub number_of_positions: u32,

    pub posted_date: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Whether candidates may still apply.
    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Open
    }

    /// Days elapsed since the job was posted.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.posted_date).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_type_wire_names() {
        assert_eq!(JobType::FullTime.as_str(), "Full-Time");
        assert_eq!(JobType::parse("Part-Time"), Some(JobType::PartTime));
        assert_eq!(JobType::parse("full-time"), None);
    }

    #[test]
    fn test_status_transitions() {
        assert_eq!(JobStatus::default(), JobStatus::Draft);
        assert!(!JobStatus::Open.is_terminal());
        assert!(JobStatus::Closed.is_terminal());
        assert!(JobStatus::Expired.is_terminal());
        assert!(!JobStatus::Draft.is_terminal());
    }

    #[test]
    fn test_category_default_and_spaces() {
        assert_eq!(JobCategory::default(), JobCategory::Other);
        assert_eq!(
            JobCategory::parse("Human Resources"),
            Some(JobCategory::HumanResources)
        );
        assert_eq!(JobCategory::parse("Astronomy"), None);
    }

    #[test]
    fn test_workplace_plane_default() {
        assert_eq!(WorkplacePlane::default(), WorkplacePlane::OnSite);
        assert_eq!(WorkplacePlane::parse("On-site"), Some(WorkplacePlane::OnSite));
    }

    #[test]
    fn test_salary_range_serde_defaults() {
        let r: SalaryRange = serde_json::from_str(r#"{"min":100000.0,"max":500000.0}"#).unwrap();
        assert_eq!(r.currency, "INR");
        assert_eq!(r.frequency, "yearly");
    }
}
