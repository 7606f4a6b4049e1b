//! Student session store
//!
//! Owns the verification-code identity and its exam/session linkage. The
//! status field changes repeatedly during an exam and is stored as received.

use std::sync::Arc;

use super::cell::IdentityCell;
use super::{classify_auth_failure, VERIFY_CODE_REJECTION_STATUSES};
use super::identity::{StudentIdentity, StudentSessionRecord, VerifyCodeRequest, VerifyCodeResponse};
use crate::client::RequestDispatcher;
use crate::constants::{STUDENT_SESSION_KEY, STUDENT_TOKEN_KEY, VERIFY_CODE_ENDPOINT};
use crate::error::{Result, SessionError};
use crate::storage::{KeyValueStore, StorageWrite};

pub struct StudentSessionStore {
    identity: IdentityCell<StudentIdentity>,
    storage: Arc<dyn KeyValueStore>,
    dispatcher: Arc<RequestDispatcher>,
}

impl StudentSessionStore {
    pub fn new(
        identity: IdentityCell<StudentIdentity>,
        storage: Arc<dyn KeyValueStore>,
        dispatcher: Arc<RequestDispatcher>,
    ) -> Self {
        Self {
            identity,
            storage,
            dispatcher,
        }
    }

    /// Read the persisted shadow copy
    pub fn restore(storage: &dyn KeyValueStore) -> Result<Option<StudentIdentity>> {
        let token = storage.get(STUDENT_TOKEN_KEY)?.filter(|t| !t.is_empty());
        let record = storage.get(STUDENT_SESSION_KEY)?;

        let (token, record) = match (token, record) {
            (Some(token), Some(record)) => (token, record),
            (None, None) => return Ok(None),
            _ => {
                log::warn!("Incomplete student shadow copy found, ignoring it");
                return Ok(None);
            }
        };

        match serde_json::from_str::<StudentSessionRecord>(&record) {
            Ok(record) => Ok(Some(StudentIdentity::from_parts(token, record))),
            Err(e) => {
                log::warn!("Unreadable student session in storage, ignoring it: {}", e);
                Ok(None)
            }
        }
    }

    /// Exchange a verification code for a student session
    pub async fn verify_code(&self, code: &str, student_name: &str) -> Result<StudentIdentity> {
        let response: VerifyCodeResponse = self
            .dispatcher
            .post(VERIFY_CODE_ENDPOINT, &VerifyCodeRequest { code, student_name })
            .await
            .map_err(|e| classify_auth_failure(e, VERIFY_CODE_REJECTION_STATUSES))?;

        if response.access_token.is_empty() {
            return Err(SessionError::Auth(
                "Verification response carried an empty token".to_string(),
            ));
        }

        let identity = StudentIdentity {
            token: response.access_token,
            exam_id: response.exam_id,
            session_id: response.session_id,
            status: response.status,
        };
        self.save(Some(identity.clone()))?;

        log::info!(
            "Student session {} opened for exam {} ({})",
            identity.session_id,
            identity.exam_id,
            identity.status
        );
        Ok(identity)
    }

    pub fn get_student_token(&self) -> String {
        self.identity.token().unwrap_or_default()
    }

    /// Drop the student session. Calling it without a session is a no-op.
    pub fn clear_session(&self) -> Result<()> {
        if self.identity.snapshot().is_none()
            && self.storage.get(STUDENT_TOKEN_KEY)?.is_none()
            && self.storage.get(STUDENT_SESSION_KEY)?.is_none()
        {
            return Ok(());
        }
        self.save(None)?;
        log::info!("Student session cleared");
        Ok(())
    }

    /// Replace the session status. Without an active session nothing happens.
    pub fn update_status(&self, status: &str) -> Result<()> {
        let mut live = self.identity.lock()?;
        let Some(mut identity) = live.clone() else {
            log::debug!("No student session, status update to '{}' ignored", status);
            return Ok(());
        };

        identity.status = status.to_string();
        self.commit(&mut live, Some(identity))
    }

    pub fn identity(&self) -> Option<StudentIdentity> {
        self.identity.snapshot()
    }

    pub fn has_session(&self) -> bool {
        self.identity.token().is_some()
    }

    pub fn exam_id(&self) -> String {
        self.read_field(|i| i.exam_id.clone())
    }

    pub fn session_id(&self) -> String {
        self.read_field(|i| i.session_id.clone())
    }

    pub fn session_status(&self) -> String {
        self.read_field(|i| i.status.clone())
    }

    fn read_field(&self, f: impl FnOnce(&StudentIdentity) -> String) -> String {
        self.identity.read(|identity| identity.map(f)).unwrap_or_default()
    }

    fn save(&self, identity: Option<StudentIdentity>) -> Result<()> {
        let mut live = self.identity.lock()?;
        self.commit(&mut live, identity)
    }

    /// Storage first, memory once storage succeeded
    fn commit(
        &self,
        live: &mut Option<StudentIdentity>,
        identity: Option<StudentIdentity>,
    ) -> Result<()> {
        let writes = match &identity {
            Some(identity) => vec![
                StorageWrite::set(STUDENT_TOKEN_KEY, identity.token.as_str()),
                StorageWrite::set(STUDENT_SESSION_KEY, serde_json::to_string(&identity.record())?),
            ],
            None => vec![
                StorageWrite::remove(STUDENT_TOKEN_KEY),
                StorageWrite::remove(STUDENT_SESSION_KEY),
            ],
        };
        self.storage.apply(&writes)?;

        *live = identity;
        Ok(())
    }
}
