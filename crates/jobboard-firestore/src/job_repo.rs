//! Typed repository for job documents.

use std::collections::HashMap;

use chrono::Utc;
use tracing::info;

use jobboard_models::{
    ApplicationId, Job, JobCategory, JobId, JobStatus, JobType, SalaryRange, WorkLocation,
    WorkplacePlane,
};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{FromFirestoreValue, MapValue, StructuredQuery, ToFirestoreValue, Value};

const JOBS_COLLECTION: &str = "jobs";

/// Every persisted job field. Used as the update mask on saves so that
/// fields absent from the write (a cleared salary range, a removed
/// deadline) are deleted from the document rather than left stale.
const JOB_FIELD_MASK: &[&str] = &[
    "title",
    "description",
    "job_type",
    "experience_years",
    "category",
    "workplace_plane",
    "work_location",
    "salary_range",
    "skills",
    "benefits",
    "company_id",
    "company_name",
    "created_by",
    "applications",
    "status",
    "number_of_positions",
    "posted_date",
    "deadline",
    "created_at",
    "updated_at",
];

/// Repository for job documents.
pub struct JobRepository {
    client: FirestoreClient,
}

impl JobRepository {
    /// Create a new job repository.
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Create a new job record.
    pub async fn create(&self, job: &Job) -> FirestoreResult<()> {
        let fields = job_to_fields(job);
        self.client
            .create_document(JOBS_COLLECTION, job.id.as_str(), fields)
            .await?;
        info!("Created job record: {}", job.id);
        Ok(())
    }

    /// Get a job by ID.
    pub async fn get(&self, job_id: &JobId) -> FirestoreResult<Option<Job>> {
        let doc = self
            .client
            .get_document(JOBS_COLLECTION, job_id.as_str())
            .await?;

        match doc {
            Some(d) => Ok(Some(document_to_job(&d, job_id)?)),
            None => Ok(None),
        }
    }

    /// Persist the full job state.
    ///
    /// Writes under the full field mask, so optional fields the job no
    /// longer carries (salary range, deadline) are removed from the
    /// stored document.
    pub async fn save(&self, job: &Job) -> FirestoreResult<()> {
        let fields = job_to_fields(job);
        let mask = JOB_FIELD_MASK.iter().map(|f| f.to_string()).collect();
        self.client
            .update_document(JOBS_COLLECTION, job.id.as_str(), fields, Some(mask))
            .await?;
        Ok(())
    }

    /// List jobs posted by a recruiter, newest first.
    pub async fn list_by_creator(&self, creator_uid: &str) -> FirestoreResult<Vec<Job>> {
        let query = StructuredQuery::collection_newest_first(JOBS_COLLECTION, "posted_date")
            .with_equals("created_by", creator_uid);
        let docs = self.client.run_query(query).await?;
        Ok(docs_to_jobs(docs))
    }

    /// List all jobs, newest first.
    pub async fn list_all(&self) -> FirestoreResult<Vec<Job>> {
        let query = StructuredQuery::collection_newest_first(JOBS_COLLECTION, "posted_date");
        let docs = self.client.run_query(query).await?;
        Ok(docs_to_jobs(docs))
    }

    /// Maximum retries for optimistic concurrency updates.
    const MAX_APPEND_RETRIES: u32 = 5;

    /// Append an application reference to a job's back-reference array.
    ///
    /// Concurrent applicants race on this array, so the write carries the
    /// document's updateTime as a precondition and retries on conflict.
    /// Appending an id that is already present is a no-op.
    pub async fn append_application(
        &self,
        job_id: &JobId,
        application_id: &ApplicationId,
    ) -> FirestoreResult<()> {
        use tracing::{debug, warn};

        let mut last_error = None;

        for attempt in 0..Self::MAX_APPEND_RETRIES {
            let doc = self
                .client
                .get_document(JOBS_COLLECTION, job_id.as_str())
                .await?;

            let (mut applications, update_time) = match &doc {
                Some(d) => {
                    let apps = d
                        .fields
                        .as_ref()
                        .and_then(|f| f.get("applications"))
                        .and_then(|v| Vec::<String>::from_firestore_value(v))
                        .unwrap_or_default();
                    (apps, d.update_time.clone())
                }
                None => {
                    return Err(FirestoreError::not_found(format!(
                        "Job {} not found",
                        job_id.as_str()
                    )));
                }
            };

            if applications.iter().any(|a| a == application_id.as_str()) {
                return Ok(());
            }
            applications.push(application_id.as_str().to_string());

            let mut fields = HashMap::new();
            fields.insert("applications".to_string(), applications.to_firestore_value());
            fields.insert("updated_at".to_string(), Utc::now().to_firestore_value());

            let update_mask = vec!["applications".to_string(), "updated_at".to_string()];

            match self
                .client
                .update_document_with_precondition(
                    JOBS_COLLECTION,
                    job_id.as_str(),
                    fields,
                    Some(update_mask),
                    update_time.as_deref(),
                )
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) if e.is_precondition_failed() => {
                    // Another applicant updated the array; re-read and retry
                    debug!(
                        "Application append precondition failed for {} (attempt {}), retrying",
                        job_id.as_str(),
                        attempt + 1
                    );
                    last_error = Some(e);
                    tokio::time::sleep(std::time::Duration::from_millis(50 * (attempt as u64 + 1)))
                        .await;
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            "Application append failed after {} retries for {}: {:?}",
            Self::MAX_APPEND_RETRIES,
            job_id.as_str(),
            last_error
        );
        Err(FirestoreError::request_failed(format!(
            "Failed to record application on job after {} retries",
            Self::MAX_APPEND_RETRIES
        )))
    }
}

fn docs_to_jobs(docs: Vec<crate::types::Document>) -> Vec<Job> {
    docs.iter()
        .filter_map(|doc| {
            let id = JobId::from_string(doc.doc_id()?);
            document_to_job(doc, &id).ok()
        })
        .collect()
}

// Helper functions for conversion

fn work_location_to_value(location: &WorkLocation) -> Value {
    let mut fields = HashMap::new();
    fields.insert("city".to_string(), location.city.to_firestore_value());
    fields.insert("state".to_string(), location.state.to_firestore_value());
    fields.insert("pincode".to_string(), location.pincode.to_firestore_value());
    fields.insert("area".to_string(), location.area.to_firestore_value());
    fields.insert(
        "street_address".to_string(),
        location.street_address.to_firestore_value(),
    );
    fields.insert("country".to_string(), location.country.to_firestore_value());
    Value::MapValue(MapValue {
        fields: Some(fields),
    })
}

fn salary_range_to_value(salary: &SalaryRange) -> Value {
    let mut fields = HashMap::new();
    fields.insert("min".to_string(), salary.min.to_firestore_value());
    fields.insert("max".to_string(), salary.max.to_firestore_value());
    fields.insert("currency".to_string(), salary.currency.to_firestore_value());
    fields.insert("frequency".to_string(), salary.frequency.to_firestore_value());
    Value::MapValue(MapValue {
        fields: Some(fields),
    })
}

pub(crate) fn job_to_fields(job: &Job) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert("title".to_string(), job.title.to_firestore_value());
    fields.insert("description".to_string(), job.description.to_firestore_value());
    fields.insert("job_type".to_string(), job.job_type.as_str().to_firestore_value());
    fields.insert(
        "experience_years".to_string(),
        job.experience_years.to_firestore_value(),
    );
    fields.insert("category".to_string(), job.category.as_str().to_firestore_value());
    fields.insert(
        "workplace_plane".to_string(),
        job.workplace_plane.as_str().to_firestore_value(),
    );
    fields.insert(
        "work_location".to_string(),
        work_location_to_value(&job.work_location),
    );
    if let Some(ref salary) = job.salary_range {
        fields.insert("salary_range".to_string(), salary_range_to_value(salary));
    }
    fields.insert("skills".to_string(), job.skills.to_firestore_value());
    fields.insert("benefits".to_string(), job.benefits.to_firestore_value());
    fields.insert("company_id".to_string(), job.company_id.to_firestore_value());
    fields.insert("company_name".to_string(), job.company_name.to_firestore_value());
    fields.insert("created_by".to_string(), job.created_by.to_firestore_value());
    fields.insert(
        "applications".to_string(),
        job.applications
            .iter()
            .map(|a| a.as_str().to_string())
            .collect::<Vec<String>>()
            .to_firestore_value(),
    );
    fields.insert("status".to_string(), job.status.as_str().to_firestore_value());
    fields.insert(
        "number_of_positions".to_string(),
        job.number_of_positions.to_firestore_value(),
    );
    fields.insert("posted_date".to_string(), job.posted_date.to_firestore_value());
    if let Some(deadline) = job.deadline {
        fields.insert("deadline".to_string(), deadline.to_firestore_value());
    }
    fields.insert("created_at".to_string(), job.created_at.to_firestore_value());
    fields.insert("updated_at".to_string(), job.updated_at.to_firestore_value());
    fields
}

fn map_fields(value: &Value) -> Option<&HashMap<String, Value>> {
    match value {
        Value::MapValue(map) => map.fields.as_ref(),
        _ => None,
    }
}

fn value_to_work_location(value: &Value) -> Option<WorkLocation> {
    let fields = map_fields(value)?;
    let get_string = |key: &str| -> String {
        fields
            .get(key)
            .and_then(|v| String::from_firestore_value(v))
            .unwrap_or_default()
    };
    Some(WorkLocation {
        city: get_string("city"),
        state: get_string("state"),
        pincode: get_string("pincode"),
        area: get_string("area"),
        street_address: get_string("street_address"),
        country: {
            let c = get_string("country");
            if c.is_empty() {
                "India".to_string()
            } else {
                c
            }
        },
    })
}

fn value_to_salary_range(value: &Value) -> Option<SalaryRange> {
    let fields = map_fields(value)?;
    Some(SalaryRange {
        min: fields.get("min").and_then(|v| f64::from_firestore_value(v))?,
        max: fields.get("max").and_then(|v| f64::from_firestore_value(v))?,
        currency: fields
            .get("currency")
            .and_then(|v| String::from_firestore_value(v))
            .unwrap_or_else(|| "INR".to_string()),
        frequency: fields
            .get("frequency")
            .and_then(|v| String::from_firestore_value(v))
            .unwrap_or_else(|| "yearly".to_string()),
    })
}

pub(crate) fn document_to_job(
    doc: &crate::types::Document,
    job_id: &JobId,
) -> FirestoreResult<Job> {
    let fields = doc
        .fields
        .as_ref()
        .ok_or_else(|| FirestoreError::InvalidResponse("Document has no fields".to_string()))?;

    let get_string = |key: &str| -> String {
        fields
            .get(key)
            .and_then(|v| String::from_firestore_value(v))
            .unwrap_or_default()
    };

    let get_f64 = |key: &str| -> f64 {
        fields
            .get(key)
            .and_then(|v| f64::from_firestore_value(v))
            .unwrap_or(0.0)
    };

    let get_strings = |key: &str| -> Vec<String> {
        fields
            .get(key)
            .and_then(|v| Vec::<String>::from_firestore_value(v))
            .unwrap_or_default()
    };

    let job_type = JobType::parse(&get_string("job_type")).ok_or_else(|| {
        FirestoreError::InvalidResponse(format!(
            "Job {} has unrecognized job_type",
            job_id.as_str()
        ))
    })?;

    Ok(Job {
        id: job_id.clone(),
        title: get_string("title"),
        description: get_string("description"),
        job_type,
        experience_years: get_f64("experience_years"),
        category: JobCategory::parse(&get_string("category")).unwrap_or_default(),
        workplace_plane: WorkplacePlane::parse(&get_string("workplace_plane")).unwrap_or_default(),
        work_location: fields
            .get("work_location")
            .and_then(value_to_work_location)
            .ok_or_else(|| {
                FirestoreError::InvalidResponse(format!(
                    "Job {} has no work_location",
                    job_id.as_str()
                ))
            })?,
        salary_range: fields.get("salary_range").and_then(value_to_salary_range),
        skills: get_strings("skills"),
        benefits: get_strings("benefits"),
        company_id: get_string("company_id"),
        company_name: get_string("company_name"),
        created_by: get_string("created_by"),
        applications: get_strings("applications")
            .into_iter()
            .map(ApplicationId::from_string)
            .collect(),
        status: JobStatus::parse(&get_string("status")).unwrap_or_default(),
        number_of_positions: fields
            .get("number_of_positions")
            .and_then(|v| u32::from_firestore_value(v))
            .unwrap_or(1),
        posted_date: fields
            .get("posted_date")
            .and_then(|v| chrono::DateTime::from_firestore_value(v))
            .unwrap_or_else(Utc::now),
        deadline: fields
            .get("deadline")
            .and_then(|v| chrono::DateTime::from_firestore_value(v)),
        created_at: fields
            .get("created_at")
            .and_then(|v| chrono::DateTime::from_firestore_value(v))
            .unwrap_or_else(Utc::now),
        updated_at: fields
            .get("updated_at")
            .and_then(|v| chrono::DateTime::from_firestore_value(v))
            .unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Document;

    fn sample_job() -> Job {
        let now = Utc::now();
        Job {
            id: JobId::from_string("job-1"),
            title: "Backend Engineer".to_string(),
            description: "Build and run the hiring platform backend.".to_string(),
            job_type: JobType::FullTime,
            experience_years: 2.5,
            category: JobCategory::Engineering,
            workplace_plane: WorkplacePlane::Hybrid,
            work_location: WorkLocation {
                city: "Pune".to_string(),
                state: "MH".to_string(),
                pincode: "411001".to_string(),
                area: "Baner".to_string(),
                street_address: "12 Main Rd".to_string(),
                country: "India".to_string(),
            },
            salary_range: Some(SalaryRange {
                min: 600_000.0,
                max: 1_200_000.0,
                currency: "INR".to_string(),
                frequency: "yearly".to_string(),
            }),
            skills: vec!["rust".to_string(), "axum".to_string()],
            benefits: vec!["insurance".to_string()],
            company_id: "comp-1".to_string(),
            company_name: "Acme".to_string(),
            created_by: "recruiter-1".to_string(),
            applications: vec![ApplicationId::from_string("job-1_user-9")],
            status: JobStatus::Open,
            number_of_positions: 3,
            posted_date: now,
            deadline: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn job_round_trips_through_fields() {
        let job = sample_job();
        let fields = job_to_fields(&job);
        let doc = Document::new(fields);
        let back = document_to_job(&doc, &job.id).unwrap();

        assert_eq!(back.title, job.title);
        assert_eq!(back.job_type, JobType::FullTime);
        assert_eq!(back.experience_years, 2.5);
        assert_eq!(back.work_location.pincode, "411001");
        assert_eq!(back.salary_range.unwrap().max, 1_200_000.0);
        assert_eq!(back.applications.len(), 1);
        assert_eq!(back.status, JobStatus::Open);
        assert_eq!(back.number_of_positions, 3);
    }

    #[test]
    fn absent_salary_and_deadline_stay_absent() {
        let mut job = sample_job();
        job.salary_range = None;
        let fields = job_to_fields(&job);
        assert!(!fields.contains_key("salary_range"));
        assert!(!fields.contains_key("deadline"));

        let doc = Document::new(fields);
        let back = document_to_job(&doc, &job.id).unwrap();
        assert!(back.salary_range.is_none());
        assert!(back.deadline.is_none());
    }

    #[test]
    fn save_mask_covers_clearable_fields() {
        assert!(JOB_FIELD_MASK.contains(&"salary_range"));
        assert!(JOB_FIELD_MASK.contains(&"deadline"));
        assert!(JOB_FIELD_MASK.contains(&"benefits"));
    }

    #[test]
    fn unknown_enum_values_fall_back_to_defaults() {
        let job = sample_job();
        let mut fields = job_to_fields(&job);
        fields.insert("category".to_string(), "Astrology".to_firestore_value());
        fields.insert("workplace_plane".to_string(), "Moon".to_firestore_value());
        fields.insert("status".to_string(), "???".to_firestore_value());

        let doc = Document::new(fields);
        let back = document_to_job(&doc, &job.id).unwrap();
        assert_eq!(back.category, JobCategory::Other);
        assert_eq!(back.workplace_plane, WorkplacePlane::OnSite);
        assert_eq!(back.status, JobStatus::Draft);
    }
}
