use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{ROUTE_ADMIN_HOME, ROUTE_TEACHER_HOME};
use crate::error::SessionError;

/// Staff roles issued by the credential login endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Teacher,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Teacher => "teacher",
        }
    }

    /// Route a logged-in user of this role lands on
    pub fn home_route(&self) -> &'static str {
        match self {
            StaffRole::Admin => ROUTE_ADMIN_HOME,
            StaffRole::Teacher => ROUTE_TEACHER_HOME,
        }
    }

    /// Whether this role may open routes reserved for `required`.
    /// Admin is a superset of teacher.
    pub fn satisfies(&self, required: StaffRole) -> bool {
        match required {
            StaffRole::Admin => *self == StaffRole::Admin,
            StaffRole::Teacher => matches!(self, StaffRole::Teacher | StaffRole::Admin),
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(StaffRole::Admin),
            "teacher" => Ok(StaffRole::Teacher),
            other => Err(SessionError::Auth(format!("Unsupported staff role '{}'", other))),
        }
    }
}

/// Anything that can put a bearer token on an outbound request
pub trait BearerIdentity {
    fn token(&self) -> &str;
}

/// Authenticated administrator or teacher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffIdentity {
    pub token: String,
    pub role: StaffRole,
    pub display_name: String,
}

impl BearerIdentity for StaffIdentity {
    fn token(&self) -> &str {
        &self.token
    }
}

/// Staff profile as persisted next to the token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub role: StaffRole,
    pub display_name: String,
}

impl StaffIdentity {
    pub fn profile(&self) -> StaffProfile {
        StaffProfile {
            role: self.role,
            display_name: self.display_name.clone(),
        }
    }

    pub fn from_parts(token: String, profile: StaffProfile) -> Self {
        Self {
            token,
            role: profile.role,
            display_name: profile.display_name,
        }
    }
}

/// Authenticated student, scoped to one exam session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentIdentity {
    pub token: String,
    pub exam_id: String,
    pub session_id: String,
    /// Server-assigned lifecycle status, stored as received
    pub status: String,
}

impl BearerIdentity for StudentIdentity {
    fn token(&self) -> &str {
        &self.token
    }
}

/// Exam/session linkage as persisted next to the student token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSessionRecord {
    pub exam_id: String,
    pub session_id: String,
    pub status: String,
}

impl StudentIdentity {
    pub fn record(&self) -> StudentSessionRecord {
        StudentSessionRecord {
            exam_id: self.exam_id.clone(),
            session_id: self.session_id.clone(),
            status: self.status.clone(),
        }
    }

    pub fn from_parts(token: String, record: StudentSessionRecord) -> Self {
        Self {
            token,
            exam_id: record.exam_id,
            session_id: record.session_id,
            status: record.status,
        }
    }
}

/// `POST /auth/login` request body
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST /auth/login` response payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub role: String,
    pub display_name: String,
}

/// `POST /auth/verify-code` request body
#[derive(Debug, Serialize)]
pub struct VerifyCodeRequest<'a> {
    pub code: &'a str,
    pub student_name: &'a str,
}

/// `POST /auth/verify-code` response payload
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyCodeResponse {
    pub access_token: String,
    pub exam_id: String,
    pub session_id: String,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_is_closed() {
        assert_eq!("admin".parse::<StaffRole>().unwrap(), StaffRole::Admin);
        assert_eq!("teacher".parse::<StaffRole>().unwrap(), StaffRole::Teacher);
        assert!("student".parse::<StaffRole>().is_err());
        assert!("Admin".parse::<StaffRole>().is_err());
        assert!("".parse::<StaffRole>().is_err());
    }

    #[test]
    fn test_admin_is_superset_of_teacher() {
        assert!(StaffRole::Admin.satisfies(StaffRole::Teacher));
        assert!(StaffRole::Admin.satisfies(StaffRole::Admin));
        assert!(StaffRole::Teacher.satisfies(StaffRole::Teacher));
        assert!(!StaffRole::Teacher.satisfies(StaffRole::Admin));
    }

    #[test]
    fn test_profile_json_shape() {
        let profile = StaffProfile {
            role: StaffRole::Teacher,
            display_name: "林老師".to_string(),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "teacher", "display_name": "林老師" }));
    }
}
