//! Bearer token authentication.
//!
//! Tokens are HS256 JWTs issued by the identity collaborator; this crate
//! only verifies them. Claims carry the user id, role and email. Auth
//! failures stop the request before any handler logic runs.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use jobboard_models::UserRole;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims as issued by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// "candidate", "recruiter" or "admin"
    pub role: String,
    pub email: String,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub role: UserRole,
    pub email: String,
}

impl AuthUser {
    /// Recruiters and admins manage jobs and review applications.
    pub fn require_job_manager(&self) -> Result<(), ApiError> {
        if self.role.can_manage_jobs() {
            Ok(())
        } else {
            Err(ApiError::forbidden("This action requires a recruiter account"))
        }
    }

    pub fn require_candidate(&self) -> Result<(), ApiError> {
        if self.role == UserRole::Candidate {
            Ok(())
        } else {
            Err(ApiError::forbidden("This action requires a candidate account"))
        }
    }
}

fn parse_role(role: &str) -> Result<UserRole, ApiError> {
    match role.to_lowercase().as_str() {
        "candidate" => Ok(UserRole::Candidate),
        "recruiter" => Ok(UserRole::Recruiter),
        "admin" => Ok(UserRole::Admin),
        other => Err(ApiError::unauthorized(format!(
            "Unrecognized role claim: {}",
            other
        ))),
    }
}

/// Verify a bearer token against the configured secret.
pub fn verify_token(token: &str, secret: &str) -> Result<AuthUser, ApiError> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

    Ok(AuthUser {
        uid: data.claims.sub,
        role: parse_role(&data.claims.role)?,
        email: data.claims.email,
    })
}

/// Authenticate a request from its headers. Runs before any handler
/// logic; every failure is a 401.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthUser, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Authorization header must be a bearer token"))?;

    verify_token(token, secret)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, &state.config.jwt_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-at-least-16-bytes";

    fn make_token(role: &str, exp_offset_secs: i64) -> String {
        let claims = Claims {
            sub: "user-1".to_string(),
            role: role.to_string(),
            email: "user1@example.com".to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset_secs,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_user() {
        let token = make_token("recruiter", 3600);
        let user = verify_token(&token, SECRET).unwrap();
        assert_eq!(user.uid, "user-1");
        assert_eq!(user.role, UserRole::Recruiter);
        assert!(user.require_job_manager().is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = make_token("candidate", -3600);
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = make_token("candidate", 3600);
        assert!(verify_token(&token, "another-secret-16-bytes!").is_err());
    }

    #[test]
    fn candidate_cannot_manage_jobs() {
        let token = make_token("candidate", 3600);
        let user = verify_token(&token, SECRET).unwrap();
        assert!(user.require_job_manager().is_err());
        assert!(user.require_candidate().is_ok());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let token = make_token("owner", 3600);
        assert!(verify_token(&token, SECRET).is_err());
    }

    #[test]
    fn missing_authorization_header_is_401() {
        let headers = HeaderMap::new();
        match authenticate(&headers, SECRET) {
            Err(ApiError::Unauthorized(_)) => {}
            other => panic!("expected Unauthorized, got {:?}", other.map(|u| u.uid)),
        }
    }

    #[test]
    fn non_bearer_authorization_is_401() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Basic dXNlcjpwYXNz".parse().unwrap(),
        );
        match authenticate(&headers, SECRET) {
            Err(ApiError::Unauthorized(_)) => {}
            other => panic!("expected Unauthorized, got {:?}", other.map(|u| u.uid)),
        }
    }

    #[test]
    fn bearer_header_authenticates() {
        let token = make_token("candidate", 3600);
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        let user = authenticate(&headers, SECRET).unwrap();
        assert_eq!(user.role, UserRole::Candidate);
    }
}
