//! User role read from auth claims.
//!
//! Identity issuance lives in the auth collaborator; the core only reads
//! uid, role and email.

use serde::{Deserialize, Serialize};

/// Role carried in the auth token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Candidate,
    Recruiter,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Candidate => "candidate",
            UserRole::Recruiter => "recruiter",
            UserRole::Admin => "admin",
        }
    }

    /// Recruiters and admins may manage jobs and review applications.
    pub fn can_manage_jobs(&self) -> bool {
        matches!(self, UserRole::Recruiter | UserRole::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde() {
        let r: UserRole = serde_json::from_str("\"recruiter\"").unwrap();
        assert_eq!(r, UserRole::Recruiter);
        assert!(r.can_manage_jobs());
        assert!(!UserRole::Candidate.can_manage_jobs());
    }
}
