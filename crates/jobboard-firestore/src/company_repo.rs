//! Typed repository for company documents.
//!
//! Companies are managed by a separate surface; this crate only reads
//! them. Job posting trusts the company's stored status for employer
//! legitimacy and does not run the approval workflow itself.

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::FromFirestoreValue;

const COMPANIES_COLLECTION: &str = "companies";

/// A company document, as far as job posting needs to know it.
#[derive(Debug, Clone)]
pub struct CompanyRecord {
    pub id: String,
    pub name: String,
    /// Approval status set by the admin workflow ("approved", "pending",
    /// "rejected").
    pub status: String,
}

impl CompanyRecord {
    /// Whether jobs may be posted under this company.
    pub fn is_approved(&self) -> bool {
        self.status.eq_ignore_ascii_case("approved")
    }
}

/// Read-only repository for company documents.
pub struct CompanyRepository {
    client: FirestoreClient,
}

impl CompanyRepository {
    /// Create a new company repository.
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Get a company by ID.
    pub async fn get(&self, company_id: &str) -> FirestoreResult<Option<CompanyRecord>> {
        let doc = self
            .client
            .get_document(COMPANIES_COLLECTION, company_id)
            .await?;

        match doc {
            Some(d) => {
                let fields = d.fields.as_ref().ok_or_else(|| {
                    FirestoreError::InvalidResponse("Document has no fields".to_string())
                })?;

                let get_string = |key: &str| -> String {
                    fields
                        .get(key)
                        .and_then(|v| String::from_firestore_value(v))
                        .unwrap_or_default()
                };

                Ok(Some(CompanyRecord {
                    id: company_id.to_string(),
                    name: get_string("name"),
                    status: get_string("status"),
                }))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_is_case_insensitive() {
        let company = CompanyRecord {
            id: "comp-1".to_string(),
            name: "Acme".to_string(),
            status: "Approved".to_string(),
        };
        assert!(company.is_approved());
    }

    #[test]
    fn pending_company_is_not_approved() {
        let company = CompanyRecord {
            id: "comp-1".to_string(),
            name: "Acme".to_string(),
            status: "pending".to_string(),
        };
        assert!(!company.is_approved());
    }
}
