//! Typed input DTOs with a parse-and-validate step.
//!
//! Request bodies arrive duck-typed: numbers may be JSON numbers or strings,
//! list fields may be arrays or comma-separated strings. Each DTO coerces
//! and validates into a typed value before any domain logic runs, returning
//! the first failing rule as a distinct error.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;

use crate::job::{
    default_country, default_currency, default_frequency, Job, JobCategory, JobId, JobStatus,
    JobType, SalaryRange, WorkLocation, WorkplacePlane,
};

// ============================================================================
// Errors
// ============================================================================

/// First-failing-rule validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(String),

    #[error("workLocation.pincode must be exactly 6 digits")]
    InvalidPincode,

    #[error("experienceLevel must be a number like '2' or '2.5'")]
    InvalidExperience,

    #[error("numberOfPositions must be an integer of at least 1")]
    InvalidPositions,

    #[error("skills must contain at least one entry")]
    EmptySkills,

    #[error("jobTitle must be between 3 and 100 characters")]
    TitleLength,

    #[error("jobDescription must be at least 10 characters")]
    DescriptionTooShort,

    #[error("salaryRange values must be numeric")]
    SalaryNotNumeric,

    #[error("salaryRange values must not be negative")]
    SalaryNegative,

    #[error("minSalary cannot exceed maxSalary")]
    SalaryOrder,

    #[error("minSalary must be strictly less than maxSalary")]
    SalaryOrderStrict,

    #[error("status cannot change once a job is {}", .0.as_str())]
    TerminalStatus(JobStatus),

    #[error("no valid fields to update")]
    NoFieldsToUpdate,

    /// Aggregated schema-level failures (enum mismatches), one message per
    /// offending field.
    #[error("invalid field values")]
    Schema(Vec<String>),
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }

    /// Per-field messages for aggregated schema failures.
    pub fn field_errors(&self) -> Option<&[String]> {
        match self {
            Self::Schema(errors) => Some(errors),
            _ => None,
        }
    }
}

fn pincode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{6}$").expect("valid pincode pattern"))
}

fn experience_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d)?$").expect("valid experience pattern"))
}

// ============================================================================
// Wire coercion helpers
// ============================================================================

/// A field that may arrive as a JSON array or a comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrVec {
    List(Vec<String>),
    Str(String),
}

impl StringOrVec {
    /// Split, trim and drop empty entries.
    pub fn into_items(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            StringOrVec::List(items) => items,
            StringOrVec::Str(s) => s.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// An explicitly supplied empty string ("clear this list").
    pub fn is_blank_string(&self) -> bool {
        matches!(self, StringOrVec::Str(s) if s.trim().is_empty())
    }
}

/// A numeric field that may arrive as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Num(f64),
    Str(String),
}

impl NumberOrString {
    /// Coerce to f64; blank or unparsable strings yield None.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrString::Num(n) => Some(*n),
            NumberOrString::Str(s) => s.trim().parse().ok(),
        }
    }

    /// True for an empty or whitespace-only string.
    pub fn is_blank(&self) -> bool {
        matches!(self, NumberOrString::Str(s) if s.trim().is_empty())
    }

    /// String representation used for pattern checks.
    fn repr(&self) -> String {
        match self {
            NumberOrString::Num(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            NumberOrString::Str(s) => s.trim().to_string(),
        }
    }
}

/// A supplied, non-blank string, or None.
fn supplied(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn require_str(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    match supplied(&value) {
        Some(s) => Ok(s.to_string()),
        None => Err(ValidationError::missing(field)),
    }
}

// ============================================================================
// Create job
// ============================================================================

/// Work location as supplied on the wire, every sub-field optional so each
/// can be reported missing under its dotted name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLocationInput {
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub area: Option<String>,
    pub street_address: Option<String>,
    pub country: Option<String>,
}

impl WorkLocationInput {
    fn any_supplied(&self) -> bool {
        supplied(&self.city).is_some()
            || supplied(&self.state).is_some()
            || supplied(&self.pincode).is_some()
            || supplied(&self.area).is_some()
            || supplied(&self.street_address).is_some()
            || supplied(&self.country).is_some()
    }

    /// Validate all sub-fields as required and build the typed location.
    fn validate(self) -> Result<WorkLocation, ValidationError> {
        let city = require_str(self.city, "workLocation.city")?;
        let state = require_str(self.state, "workLocation.state")?;
        let pincode = require_str(self.pincode, "workLocation.pincode")?;
        let area = require_str(self.area, "workLocation.area")?;
        let street_address = require_str(self.street_address, "workLocation.streetAddress")?;

        if !pincode_re().is_match(&pincode) {
            return Err(ValidationError::InvalidPincode);
        }

        let country = supplied(&self.country)
            .map(str::to_string)
            .unwrap_or_else(default_country);

        Ok(WorkLocation {
            city,
            state,
            pincode,
            area,
            street_address,
            country,
        })
    }
}

/// Salary bounds as supplied on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRangeInput {
    pub min_salary: Option<NumberOrString>,
    pub max_salary: Option<NumberOrString>,
}

impl SalaryRangeInput {
    fn bound(value: &Option<NumberOrString>) -> Option<&NumberOrString> {
        value.as_ref().filter(|v| !v.is_blank())
    }

    fn min_supplied(&self) -> Option<&NumberOrString> {
        Self::bound(&self.min_salary)
    }

    fn max_supplied(&self) -> Option<&NumberOrString> {
        Self::bound(&self.max_salary)
    }

    /// Both bounds explicitly absent or blank.
    pub fn is_cleared(&self) -> bool {
        self.min_supplied().is_none() && self.max_supplied().is_none()
    }

    /// Create-time parse: both bounds numeric, non-negative, min <= max.
    fn validate_for_create(self) -> Result<Option<SalaryRange>, ValidationError> {
        if self.is_cleared() {
            return Ok(None);
        }
        let (min_raw, max_raw) = match (self.min_supplied(), self.max_supplied()) {
            (Some(min), Some(max)) => (min, max),
            _ => return Err(ValidationError::SalaryNotNumeric),
        };
        let min = min_raw.as_f64().ok_or(ValidationError::SalaryNotNumeric)?;
        let max = max_raw.as_f64().ok_or(ValidationError::SalaryNotNumeric)?;
        if min < 0.0 || max < 0.0 {
            return Err(ValidationError::SalaryNegative);
        }
        if min > max {
            return Err(ValidationError::SalaryOrder);
        }
        Ok(Some(SalaryRange {
            min,
            max,
            currency: default_currency(),
            frequency: default_frequency(),
        }))
    }
}

/// POST /job/post body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostJobRequest {
    pub job_title: Option<String>,
    pub job_description: Option<String>,
    pub work_location: Option<WorkLocationInput>,
    pub job_type: Option<String>,
    pub experience_level: Option<NumberOrString>,
    pub company_id: Option<String>,
    pub company_name: Option<String>,
    pub workplace_plane: Option<String>,
    pub job_category: Option<String>,
    pub skills: Option<StringOrVec>,
    pub benefits: Option<StringOrVec>,
    pub salary_range: Option<SalaryRangeInput>,
    pub number_of_positions: Option<NumberOrString>,
    pub deadline: Option<DateTime<Utc>>,
}

/// A fully validated job input, ready to persist.
#[derive(Debug, Clone)]
pub struct ValidatedJob {
    pub title: String,
    pub description: String,
    pub job_type: JobType,
    pub experience_years: f64,
    pub category: JobCategory,
    pub workplace_plane: WorkplacePlane,
    pub work_location: WorkLocation,
    pub salary_range: Option<SalaryRange>,
    pub skills: Vec<String>,
    pub benefits: Vec<String>,
    pub company_id: String,
    pub company_name: String,
    pub number_of_positions: u32,
    pub deadline: Option<DateTime<Utc>>,
}

impl ValidatedJob {
    /// Materialize the job; the controller posts jobs as Open.
    pub fn into_job(self, created_by: impl Into<String>) -> Job {
        let now = Utc::now();
        Job {
            id: JobId::new(),
            title: self.title,
            description: self.description,
            job_type: self.job_type,
            experience_years: self.experience_years,
            category: self.category,
            workplace_plane: self.workplace_plane,
            work_location: self.work_location,
            salary_range: self.salary_range,
            skills: self.skills,
            benefits: self.benefits,
            company_id: self.company_id,
            company_name: self.company_name,
            created_by: created_by.into(),
            applications: Vec::new(),
            status: JobStatus::Open,
            number_of_positions: self.number_of_positions,
            posted_date: now,
            deadline: self.deadline,
            created_at: now,
            updated_at: now,
        }
    }
}

impl PostJobRequest {
    /// Validate in the documented rule order, returning the first failure.
    pub fn validate(self) -> Result<ValidatedJob, ValidationError> {
        let title = require_str(self.job_title, "jobTitle")?;
        let description = require_str(self.job_description, "jobDescription")?;
        let location_input = self
            .work_location
            .ok_or_else(|| ValidationError::missing("workLocation"))?;
        let job_type_raw = require_str(self.job_type, "jobType")?;
        let experience_raw = self
            .experience_level
            .filter(|v| !v.is_blank())
            .ok_or_else(|| ValidationError::missing("experienceLevel"))?;
        let company_id = require_str(self.company_id, "companyId")?;
        let company_name = require_str(self.company_name, "companyName")?;
        let workplace_raw = require_str(self.workplace_plane, "workplacePlane")?;
        let category_raw = require_str(self.job_category, "jobCategory")?;
        let skills_input = self
            .skills
            .ok_or_else(|| ValidationError::missing("skills"))?;
        let positions_raw = self
            .number_of_positions
            .filter(|v| !v.is_blank())
            .ok_or_else(|| ValidationError::missing("numberOfPositions"))?;

        // Sub-field presence and pincode format, with dotted field names.
        let work_location = location_input.validate()?;

        let experience_repr = experience_raw.repr();
        if !experience_re().is_match(&experience_repr) {
            return Err(ValidationError::InvalidExperience);
        }
        let experience_years: f64 = experience_repr
            .parse()
            .map_err(|_| ValidationError::InvalidExperience)?;

        let number_of_positions = parse_positions(&positions_raw)?;

        let skills = skills_input.into_items();
        if skills.is_empty() {
            return Err(ValidationError::EmptySkills);
        }
        let benefits = self
            .benefits
            .map(StringOrVec::into_items)
            .unwrap_or_default();

        let salary_range = match self.salary_range {
            Some(range) => range.validate_for_create()?,
            None => None,
        };

        if title.chars().count() < 3 || title.chars().count() > 100 {
            return Err(ValidationError::TitleLength);
        }
        if description.chars().count() < 10 {
            return Err(ValidationError::DescriptionTooShort);
        }

        // Enum mismatches are schema-level and reported together.
        let mut schema_errors = Vec::new();
        let job_type = JobType::parse(&job_type_raw);
        if job_type.is_none() {
            schema_errors.push(format!("jobType: '{}' is not a valid job type", job_type_raw));
        }
        let workplace_plane = WorkplacePlane::parse(&workplace_raw);
        if workplace_plane.is_none() {
            schema_errors.push(format!(
                "workplacePlane: '{}' is not a valid workplace plane",
                workplace_raw
            ));
        }
        let category = JobCategory::parse(&category_raw);
        if category.is_none() {
            schema_errors.push(format!(
                "jobCategory: '{}' is not a valid job category",
                category_raw
            ));
        }
        match (job_type, workplace_plane, category) {
            (Some(job_type), Some(workplace_plane), Some(category)) => Ok(ValidatedJob {
                title,
                description,
                job_type,
                experience_years,
                category,
                workplace_plane,
                work_location,
                salary_range,
                skills,
                benefits,
                company_id,
                company_name,
                number_of_positions,
                deadline: self.deadline,
            }),
            _ => Err(ValidationError::Schema(schema_errors)),
        }
    }
}

fn parse_positions(raw: &NumberOrString) -> Result<u32, ValidationError> {
    let n = raw.as_f64().ok_or(ValidationError::InvalidPositions)?;
    if n.fract() != 0.0 || n < 1.0 || n > u32::MAX as f64 {
        return Err(ValidationError::InvalidPositions);
    }
    Ok(n as u32)
}

// ============================================================================
// Update job
// ============================================================================

/// PUT-style partial update body. Only supplied, non-blank fields apply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobRequest {
    pub job_title: Option<String>,
    pub job_description: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<NumberOrString>,
    pub workplace_plane: Option<String>,
    pub job_category: Option<String>,
    pub status: Option<String>,
    pub skills: Option<StringOrVec>,
    pub benefits: Option<StringOrVec>,
    pub work_location: Option<WorkLocationInput>,
    pub salary_range: Option<SalaryRangeInput>,
    pub number_of_positions: Option<NumberOrString>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Compensation change carried by a patch.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SalaryPatch {
    #[default]
    Unchanged,
    Set(SalaryRange),
    Clear,
}

/// The set of changes a partial update applies.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub job_type: Option<JobType>,
    pub experience_years: Option<f64>,
    pub category: Option<JobCategory>,
    pub workplace_plane: Option<WorkplacePlane>,
    pub status: Option<JobStatus>,
    pub skills: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub work_location: Option<WorkLocation>,
    pub salary: SalaryPatch,
    pub number_of_positions: Option<u32>,
    pub deadline: Option<DateTime<Utc>>,
}

impl JobPatch {
    /// True when no field survived filtering.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.job_type.is_none()
            && self.experience_years.is_none()
            && self.category.is_none()
            && self.workplace_plane.is_none()
            && self.status.is_none()
            && self.skills.is_none()
            && self.benefits.is_none()
            && self.work_location.is_none()
            && self.salary == SalaryPatch::Unchanged
            && self.number_of_positions.is_none()
            && self.deadline.is_none()
    }

    /// Apply the patch to a job, refreshing `updated_at`.
    pub fn apply(self, mut job: Job) -> Job {
        if let Some(title) = self.title {
            job.title = title;
        }
        if let Some(description) = self.description {
            job.description = description;
        }
        if let Some(job_type) = self.job_type {
            job.job_type = job_type;
        }
        if let Some(years) = self.experience_years {
            job.experience_years = years;
        }
        if let Some(category) = self.category {
            job.category = category;
        }
        if let Some(plane) = self.workplace_plane {
            job.workplace_plane = plane;
        }
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(skills) = self.skills {
            job.skills = skills;
        }
        if let Some(benefits) = self.benefits {
            job.benefits = benefits;
        }
        if let Some(location) = self.work_location {
            job.work_location = location;
        }
        match self.salary {
            SalaryPatch::Unchanged => {}
            SalaryPatch::Set(range) => job.salary_range = Some(range),
            SalaryPatch::Clear => job.salary_range = None,
        }
        if let Some(positions) = self.number_of_positions {
            job.number_of_positions = positions;
        }
        if let Some(deadline) = self.deadline {
            job.deadline = Some(deadline);
        }
        job.updated_at = Utc::now();
        job
    }
}

impl UpdateJobRequest {
    /// Validate against the stored job, producing the patch to apply.
    ///
    /// Salary bounds merge field-by-field with the stored range; the merged
    /// result must satisfy the strict ordering min < max, unlike create.
    pub fn validate(self, existing: &Job) -> Result<JobPatch, ValidationError> {
        let mut patch = JobPatch::default();
        let mut schema_errors = Vec::new();

        if let Some(title) = supplied(&self.job_title) {
            if title.chars().count() < 3 || title.chars().count() > 100 {
                return Err(ValidationError::TitleLength);
            }
            patch.title = Some(title.to_string());
        }
        if let Some(description) = supplied(&self.job_description) {
            if description.chars().count() < 10 {
                return Err(ValidationError::DescriptionTooShort);
            }
            patch.description = Some(description.to_string());
        }
        if let Some(raw) = supplied(&self.job_type) {
            match JobType::parse(raw) {
                Some(job_type) => patch.job_type = Some(job_type),
                None => schema_errors.push(format!("jobType: '{}' is not a valid job type", raw)),
            }
        }
        if let Some(raw) = self.experience_level.as_ref().filter(|v| !v.is_blank()) {
            let repr = raw.repr();
            if !experience_re().is_match(&repr) {
                return Err(ValidationError::InvalidExperience);
            }
            patch.experience_years = Some(repr.parse().map_err(|_| ValidationError::InvalidExperience)?);
        }
        if let Some(raw) = supplied(&self.workplace_plane) {
            match WorkplacePlane::parse(raw) {
                Some(plane) => patch.workplace_plane = Some(plane),
                None => schema_errors.push(format!(
                    "workplacePlane: '{}' is not a valid workplace plane",
                    raw
                )),
            }
        }
        if let Some(raw) = supplied(&self.job_category) {
            match JobCategory::parse(raw) {
                Some(category) => patch.category = Some(category),
                None => {
                    schema_errors.push(format!("jobCategory: '{}' is not a valid job category", raw))
                }
            }
        }
        if let Some(raw) = supplied(&self.status) {
            match JobStatus::parse(raw) {
                Some(status) => {
                    // Closed and Expired are terminal; a job cannot leave them.
                    if existing.status.is_terminal() && status != existing.status {
                        return Err(ValidationError::TerminalStatus(existing.status));
                    }
                    patch.status = Some(status);
                }
                None => schema_errors.push(format!("status: '{}' is not a valid job status", raw)),
            }
        }
        if let Some(raw) = self.number_of_positions.as_ref().filter(|v| !v.is_blank()) {
            patch.number_of_positions = Some(parse_positions(raw)?);
        }

        if let Some(skills_input) = self.skills {
            if !skills_input.is_blank_string() {
                let skills = skills_input.into_items();
                if skills.is_empty() {
                    return Err(ValidationError::EmptySkills);
                }
                patch.skills = Some(skills);
            }
        }
        // An explicit empty string clears benefits; absence leaves them alone.
        if let Some(benefits_input) = self.benefits {
            if benefits_input.is_blank_string() {
                patch.benefits = Some(Vec::new());
            } else {
                patch.benefits = Some(benefits_input.into_items());
            }
        }

        if let Some(location_input) = self.work_location {
            if location_input.any_supplied() {
                patch.work_location = Some(location_input.validate()?);
            }
        }

        if let Some(range) = self.salary_range {
            patch.salary = validate_salary_update(range, existing)?;
        }

        if let Some(deadline) = self.deadline {
            patch.deadline = Some(deadline);
        }

        if !schema_errors.is_empty() {
            return Err(ValidationError::Schema(schema_errors));
        }
        if patch.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate);
        }
        Ok(patch)
    }
}

/// Merge supplied bounds with the stored range and check strict ordering.
fn validate_salary_update(
    range: SalaryRangeInput,
    existing: &Job,
) -> Result<SalaryPatch, ValidationError> {
    if range.is_cleared() {
        return Ok(SalaryPatch::Clear);
    }

    let stored = existing.salary_range.as_ref();
    let min = match range.min_supplied() {
        Some(raw) => raw.as_f64().ok_or(ValidationError::SalaryNotNumeric)?,
        None => stored.map(|r| r.min).ok_or(ValidationError::SalaryNotNumeric)?,
    };
    let max = match range.max_supplied() {
        Some(raw) => raw.as_f64().ok_or(ValidationError::SalaryNotNumeric)?,
        None => stored.map(|r| r.max).ok_or(ValidationError::SalaryNotNumeric)?,
    };
    if min < 0.0 || max < 0.0 {
        return Err(ValidationError::SalaryNegative);
    }
    if min >= max {
        return Err(ValidationError::SalaryOrderStrict);
    }
    Ok(SalaryPatch::Set(SalaryRange {
        min,
        max,
        currency: stored
            .map(|r| r.currency.clone())
            .unwrap_or_else(default_currency),
        frequency: stored
            .map(|r| r.frequency.clone())
            .unwrap_or_else(default_frequency),
    }))
}

// ============================================================================
// Application bodies
// ============================================================================

/// POST /application/apply/:id body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplyRequest {
    pub email: Option<String>,
}

impl ApplyRequest {
    pub fn validated_email(&self) -> Result<String, ValidationError> {
        require_str(self.email.clone(), "email")
    }
}

/// POST /application/status/:id/update body.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

impl UpdateStatusRequest {
    /// The backend lower-cases but does not whitelist status values.
    pub fn validated_status(&self) -> Result<String, ValidationError> {
        require_str(self.status.clone(), "status").map(|s| s.to_lowercase())
    }
}

// ============================================================================
// Tests
// ============================================================================
