//! Search/filter layer over the job catalog.
//!
//! Translates the flat filter selections the UI sends (salary buckets
//! like "3-6Lakhs", freshness buckets like "7days", a single experience
//! integer from a slider) into typed predicates, applies them
//! conjunctively, and paginates the result.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use jobboard_models::{Job, JobCategory, JobType};

use crate::error::ApiError;

const LAKH: f64 = 100_000.0;

/// Raw query parameters for GET /job/search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub work_type: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    /// Salary bucket, e.g. "3-6Lakhs"
    pub salary: Option<String>,
    /// Years of experience, a single integer
    pub experience: Option<String>,
    /// Freshness bucket, e.g. "7days"
    pub freshness: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Parsed, typed filter set.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    pub job_type: Option<JobType>,
    pub location: Option<String>,
    pub category: Option<JobCategory>,
    /// Inclusive salary bounds in rupees
    pub salary: Option<(f64, f64)>,
    /// Maximum required experience in years
    pub experience: Option<f64>,
    /// Posted within the last N days
    pub max_age_days: Option<i64>,
}

fn salary_bucket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(\d+)\s*-\s*(\d+)\s*lakhs?$").expect("valid salary pattern"))
}

fn freshness_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(\d+)\s*days?$").expect("valid freshness pattern"))
}

/// Parse a salary bucket string into rupee bounds.
pub fn parse_salary_bucket(raw: &str) -> Result<(f64, f64), ApiError> {
    let caps = salary_bucket_re()
        .captures(raw.trim())
        .ok_or_else(|| ApiError::bad_request(format!("Unrecognized salary filter: {}", raw)))?;
    let low: f64 = caps[1]
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Unrecognized salary filter: {}", raw)))?;
    let high: f64 = caps[2]
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Unrecognized salary filter: {}", raw)))?;
    if low > high {
        return Err(ApiError::bad_request(format!(
            "Salary filter bounds are inverted: {}",
            raw
        )));
    }
    Ok((low * LAKH, high * LAKH))
}

/// Parse a freshness bucket string into "posted within N days".
pub fn parse_freshness(raw: &str) -> Result<i64, ApiError> {
    let caps = freshness_re()
        .captures(raw.trim())
        .ok_or_else(|| ApiError::bad_request(format!("Unrecognized freshness filter: {}", raw)))?;
    caps[1]
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Unrecognized freshness filter: {}", raw)))
}

/// "all", blank or absent means "no filter".
fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
}

impl SearchParams {
    /// Parse into a typed filter set; unknown enum values are client errors.
    pub fn into_filters(self) -> Result<SearchFilters, ApiError> {
        let mut filters = SearchFilters::default();

        if let Some(raw) = active(&self.work_type) {
            filters.job_type = Some(JobType::parse(raw).ok_or_else(|| {
                ApiError::bad_request(format!("Unrecognized work type filter: {}", raw))
            })?);
        }
        if let Some(raw) = active(&self.location) {
            filters.location = Some(raw.to_string());
        }
        if let Some(raw) = active(&self.category) {
            filters.category = Some(JobCategory::parse(raw).ok_or_else(|| {
                ApiError::bad_request(format!("Unrecognized category filter: {}", raw))
            })?);
        }
        if let Some(raw) = active(&self.salary) {
            filters.salary = Some(parse_salary_bucket(raw)?);
        }
        if let Some(raw) = active(&self.experience) {
            let years: f64 = raw.parse().map_err(|_| {
                ApiError::bad_request(format!("Unrecognized experience filter: {}", raw))
            })?;
            filters.experience = Some(years);
        }
        if let Some(raw) = active(&self.freshness) {
            filters.max_age_days = Some(parse_freshness(raw)?);
        }

        Ok(filters)
    }
}

/// Case-insensitive match of a location term against a job's city, state
/// or area.
pub fn location_matches(job: &Job, term: &str) -> bool {
    let term = term.to_lowercase();
    job.work_location.city.to_lowercase().contains(&term)
        || job.work_location.state.to_lowercase().contains(&term)
        || job.work_location.area.to_lowercase().contains(&term)
}

impl SearchFilters {
    /// All supplied predicates must hold.
    pub fn matches(&self, job: &Job, now: DateTime<Utc>) -> bool {
        if let Some(job_type) = self.job_type {
            if job.job_type != job_type {
                return false;
            }
        }
        if let Some(ref term) = self.location {
            if !location_matches(job, term) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if job.category != category {
                return false;
            }
        }
        if let Some((min, max)) = self.salary {
            // Job's offered range must overlap the requested bucket
            match &job.salary_range {
                Some(range) => {
                    if range.max < min || range.min > max {
                        return false;
                    }
                }
                None => return false,
            }
        }
        if let Some(years) = self.experience {
            if job.experience_years > years {
                return false;
            }
        }
        if let Some(days) = self.max_age_days {
            if job.age_days(now) > days {
                return false;
            }
        }
        true
    }
}

/// One page of search results.
#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub success: bool,
    pub data: Vec<Job>,
    pub total: usize,
    pub page: u32,
    pub pages: u32,
}

/// Paginate a filtered job list.
pub fn paginate(jobs: Vec<Job>, page: Option<u32>, limit: Option<u32>) -> SearchPage {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(10).clamp(1, 100) as usize;

    let total = jobs.len();
    let pages = ((total + limit - 1) / limit) as u32;
    let start = (page as usize - 1) * limit;
    let data = if start >= total {
        Vec::new()
    } else {
        jobs.into_iter().skip(start).take(limit).collect()
    };

    SearchPage {
        success: true,
        data,
        total,
        page,
        pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobboard_models::{SalaryRange, WorkLocation, WorkplacePlane};

    fn sample_job(city: &str, job_type: JobType, salary: Option<(f64, f64)>, age_days: i64) -> Job {
        let now = Utc::now();
        let posted = now - chrono::Duration::days(age_days);
        Job {
            id: jobboard_models::JobId::new(),
            title: "Engineer".to_string(),
            description: "A role doing engineering things".to_string(),
            job_type,
            experience_years: 2.0,
            category: JobCategory::Engineering,
            workplace_plane: WorkplacePlane::OnSite,
            work_location: WorkLocation {
                city: city.to_string(),
                state: "MH".to_string(),
                pincode: "411001".to_string(),
                area: "Central".to_string(),
                street_address: "1 Main Rd".to_string(),
                country: "India".to_string(),
            },
            salary_range: salary.map(|(min, max)| SalaryRange {
                min,
                max,
                currency: "INR".to_string(),
                frequency: "yearly".to_string(),
            }),
            skills: vec!["rust".to_string()],
            benefits: Vec::new(),
            company_id: "comp-1".to_string(),
            company_name: "Acme".to_string(),
            created_by: "recruiter-1".to_string(),
            applications: Vec::new(),
            status: jobboard_models::JobStatus::Open,
            number_of_positions: 1,
            posted_date: posted,
            deadline: None,
            created_at: posted,
            updated_at: posted,
        }
    }

    #[test]
    fn test_salary_bucket_parse() {
        assert_eq!(parse_salary_bucket("3-6Lakhs").unwrap(), (300_000.0, 600_000.0));
        assert_eq!(parse_salary_bucket("10 - 20 lakhs").unwrap(), (1_000_000.0, 2_000_000.0));
        assert!(parse_salary_bucket("lots").is_err());
        assert!(parse_salary_bucket("6-3Lakhs").is_err());
    }

    #[test]
    fn test_freshness_parse() {
        assert_eq!(parse_freshness("7days").unwrap(), 7);
        assert_eq!(parse_freshness("30 days").unwrap(), 30);
        assert!(parse_freshness("recent").is_err());
    }

    #[test]
    fn test_all_means_no_filter() {
        let params = SearchParams {
            location: Some("all".to_string()),
            work_type: Some("All".to_string()),
            ..Default::default()
        };
        let filters = params.into_filters().unwrap();
        assert!(filters.location.is_none());
        assert!(filters.job_type.is_none());
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let now = Utc::now();
        let filters = SearchFilters {
            job_type: Some(JobType::FullTime),
            location: Some("pune".to_string()),
            ..Default::default()
        };

        let hit = sample_job("Pune", JobType::FullTime, None, 1);
        let wrong_city = sample_job("Mumbai", JobType::FullTime, None, 1);
        let wrong_type = sample_job("Pune", JobType::Contract, None, 1);

        assert!(filters.matches(&hit, now));
        assert!(!filters.matches(&wrong_city, now));
        assert!(!filters.matches(&wrong_type, now));
    }

    #[test]
    fn test_salary_filter_requires_overlap() {
        let now = Utc::now();
        let filters = SearchFilters {
            salary: Some((300_000.0, 600_000.0)),
            ..Default::default()
        };

        let inside = sample_job("Pune", JobType::FullTime, Some((400_000.0, 500_000.0)), 1);
        let straddles = sample_job("Pune", JobType::FullTime, Some((500_000.0, 900_000.0)), 1);
        let below = sample_job("Pune", JobType::FullTime, Some((100_000.0, 200_000.0)), 1);
        let unsalaried = sample_job("Pune", JobType::FullTime, None, 1);

        assert!(filters.matches(&inside, now));
        assert!(filters.matches(&straddles, now));
        assert!(!filters.matches(&below, now));
        assert!(!filters.matches(&unsalaried, now));
    }

    #[test]
    fn test_freshness_filter() {
        let now = Utc::now();
        let filters = SearchFilters {
            max_age_days: Some(7),
            ..Default::default()
        };
        let fresh = sample_job("Pune", JobType::FullTime, None, 3);
        let stale = sample_job("Pune", JobType::FullTime, None, 12);
        assert!(filters.matches(&fresh, now));
        assert!(!filters.matches(&stale, now));
    }

    #[test]
    fn test_no_filters_match_everything() {
        let now = Utc::now();
        let filters = SearchFilters::default();
        let job = sample_job("Pune", JobType::Contract, None, 100);
        assert!(filters.matches(&job, now));
    }

    #[test]
    fn test_pagination_counts() {
        let jobs: Vec<Job> = (0..25)
            .map(|_| sample_job("Pune", JobType::FullTime, None, 1))
            .collect();

        let page = paginate(jobs.clone(), Some(2), Some(10));
        assert_eq!(page.total, 25);
        assert_eq!(page.pages, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.data.len(), 10);

        let past_end = paginate(jobs, Some(9), Some(10));
        assert_eq!(past_end.data.len(), 0);
        assert_eq!(past_end.total, 25);
    }

    #[test]
    fn test_pagination_defaults() {
        let jobs: Vec<Job> = (0..5)
            .map(|_| sample_job("Pune", JobType::FullTime, None, 1))
            .collect();
        let page = paginate(jobs, None, None);
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, 1);
        assert_eq!(page.data.len(), 5);
    }
}
