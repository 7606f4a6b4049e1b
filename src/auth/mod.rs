//! Staff and student identities and the stores that own them

pub mod cell;
pub mod credentials;
pub mod identity;
pub mod student;

// Re-export main components
pub use cell::IdentityCell;
pub use credentials::CredentialStore;
pub use identity::{
    BearerIdentity, StaffIdentity, StaffProfile, StaffRole, StudentIdentity, StudentSessionRecord,
};
pub use student::StudentSessionStore;

use crate::error::SessionError;

/// Statuses `/auth/login` uses to reject a username or password.
/// A 404 there means a wrong base URL, not bad credentials.
pub(crate) const LOGIN_REJECTION_STATUSES: &[u16] = &[400, 401, 403, 422];

/// Statuses `/auth/verify-code` uses to reject a code; an unknown code is a 404
pub(crate) const VERIFY_CODE_REJECTION_STATUSES: &[u16] = &[400, 401, 403, 404, 422];

/// Turn a rejected credential or code exchange into `SessionError::Auth`,
/// keeping network and server failures as transport errors
pub(crate) fn classify_auth_failure(error: SessionError, rejections: &[u16]) -> SessionError {
    match error {
        SessionError::Transport(err)
            if err.status.is_some_and(|status| rejections.contains(&status)) =>
        {
            SessionError::Auth(err.detail().unwrap_or(&err.message).to_string())
        }
        other => other,
    }
}
