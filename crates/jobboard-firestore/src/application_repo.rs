//! Typed repository for application documents.
//!
//! Applications live in a root collection keyed by the deterministic
//! `{job_id}_{applicant_uid}` pair id, so a second apply for the same
//! pair fails the create with AlreadyExists instead of racing.

use std::collections::HashMap;

use chrono::Utc;
use tracing::info;

use jobboard_models::{Application, ApplicationId, JobId};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{FromFirestoreValue, StructuredQuery, ToFirestoreValue, Value};

const APPLICATIONS_COLLECTION: &str = "applications";

/// Repository for application documents.
pub struct ApplicationRepository {
    client: FirestoreClient,
}

impl ApplicationRepository {
    /// Create a new application repository.
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Create an application record.
    ///
    /// Fails with AlreadyExists when the (job, applicant) pair already
    /// has an application on file.
    pub async fn create(&self, application: &Application) -> FirestoreResult<()> {
        let fields = application_to_fields(application);
        self.client
            .create_document(APPLICATIONS_COLLECTION, application.id.as_str(), fields)
            .await?;
        info!(
            "Created application record: {} (job {})",
            application.id, application.job_id
        );
        Ok(())
    }

    /// Get an application by ID.
    pub async fn get(&self, id: &ApplicationId) -> FirestoreResult<Option<Application>> {
        let doc = self
            .client
            .get_document(APPLICATIONS_COLLECTION, id.as_str())
            .await?;

        match doc {
            Some(d) => Ok(Some(document_to_application(&d, id)?)),
            None => Ok(None),
        }
    }

    /// List a candidate's applications, newest first.
    pub async fn list_by_applicant(&self, applicant_uid: &str) -> FirestoreResult<Vec<Application>> {
        let query = StructuredQuery::collection_newest_first(APPLICATIONS_COLLECTION, "created_at")
            .with_equals("applicant_uid", applicant_uid);
        let docs = self.client.run_query(query).await?;
        Ok(docs_to_applications(docs))
    }

    /// List applications for a job, newest first.
    pub async fn list_by_job(&self, job_id: &JobId) -> FirestoreResult<Vec<Application>> {
        let query = StructuredQuery::collection_newest_first(APPLICATIONS_COLLECTION, "created_at")
            .with_equals("job_id", job_id.as_str());
        let docs = self.client.run_query(query).await?;
        Ok(docs_to_applications(docs))
    }

    /// Update an application's status.
    ///
    /// The stored status is always lower-cased.
    pub async fn update_status(&self, id: &ApplicationId, status: &str) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert(
            "status".to_string(),
            status.to_lowercase().to_firestore_value(),
        );
        fields.insert("updated_at".to_string(), Utc::now().to_firestore_value());

        self.client
            .update_document(
                APPLICATIONS_COLLECTION,
                id.as_str(),
                fields,
                Some(vec!["status".to_string(), "updated_at".to_string()]),
            )
            .await?;
        info!("Updated application {} status to {}", id, status.to_lowercase());
        Ok(())
    }
}

fn docs_to_applications(docs: Vec<crate::types::Document>) -> Vec<Application> {
    docs.iter()
        .filter_map(|doc| {
            let id = ApplicationId::from_string(doc.doc_id()?);
            document_to_application(doc, &id).ok()
        })
        .collect()
}

// Helper functions for conversion

pub(crate) fn application_to_fields(application: &Application) -> HashMap<String, Value> {
    let mut fields = HashMap::new();
    fields.insert(
        "job_id".to_string(),
        application.job_id.as_str().to_firestore_value(),
    );
    fields.insert(
        "applicant_uid".to_string(),
        application.applicant_uid.to_firestore_value(),
    );
    fields.insert(
        "applicant_email".to_string(),
        application.applicant_email.to_firestore_value(),
    );
    fields.insert("status".to_string(), application.status.to_firestore_value());
    fields.insert(
        "created_at".to_string(),
        application.created_at.to_firestore_value(),
    );
    fields.insert(
        "updated_at".to_string(),
        application.updated_at.to_firestore_value(),
    );
    fields
}

pub(crate) fn document_to_application(
    doc: &crate::types::Document,
    id: &ApplicationId,
) -> FirestoreResult<Application> {
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

    Ok(Application {
        id: id.clone(),
        job_id: JobId::from_string(get_string("job_id")),
        applicant_uid: get_string("applicant_uid"),
        applicant_email: get_string("applicant_email"),
        status: get_string("status"),
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

    fn sample_application() -> Application {
        Application::new(JobId::from_string("job-1"), "user-9", "user9@example.com")
    }

    #[test]
    fn application_round_trips_through_fields() {
        let app = sample_application();
        let fields = application_to_fields(&app);
        let doc = Document::new(fields);
        let back = document_to_application(&doc, &app.id).unwrap();

        assert_eq!(back.id.as_str(), "job-1_user-9");
        assert_eq!(back.job_id.as_str(), "job-1");
        assert_eq!(back.applicant_email, "user9@example.com");
        assert_eq!(back.status, "pending");
    }

    #[test]
    fn stored_status_survives_round_trip() {
        let app = sample_application().with_status("Accepted");
        let fields = application_to_fields(&app);
        let doc = Document::new(fields);
        let back = document_to_application(&doc, &app.id).unwrap();
        assert_eq!(back.status, "accepted");
    }
}
