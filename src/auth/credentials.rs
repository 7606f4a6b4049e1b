//! Staff credential store
//!
//! Owns the administrator/teacher identity. The live identity sits in an
//! `IdentityCell`; the token and profile are mirrored under two fixed keys in
//! the persistent store. Both copies change together through `save`.

use std::sync::Arc;

use super::cell::IdentityCell;
use super::{classify_auth_failure, LOGIN_REJECTION_STATUSES};
use super::identity::{LoginRequest, LoginResponse, StaffIdentity, StaffProfile, StaffRole};
use crate::client::RequestDispatcher;
use crate::constants::{LOGIN_ENDPOINT, STAFF_PROFILE_KEY, STAFF_TOKEN_KEY};
use crate::error::{Result, SessionError};
use crate::storage::{KeyValueStore, StorageWrite};

pub struct CredentialStore {
    identity: IdentityCell<StaffIdentity>,
    storage: Arc<dyn KeyValueStore>,
    dispatcher: Arc<RequestDispatcher>,
}

impl CredentialStore {
    pub fn new(
        identity: IdentityCell<StaffIdentity>,
        storage: Arc<dyn KeyValueStore>,
        dispatcher: Arc<RequestDispatcher>,
    ) -> Self {
        Self {
            identity,
            storage,
            dispatcher,
        }
    }

    /// Read the persisted shadow copy. Incomplete or unreadable copies are
    /// treated as no identity.
    pub fn restore(storage: &dyn KeyValueStore) -> Result<Option<StaffIdentity>> {
        let token = storage.get(STAFF_TOKEN_KEY)?.filter(|t| !t.is_empty());
        let profile = storage.get(STAFF_PROFILE_KEY)?;

        let (token, profile) = match (token, profile) {
            (Some(token), Some(profile)) => (token, profile),
            (None, None) => return Ok(None),
            _ => {
                log::warn!("Incomplete staff shadow copy found, ignoring it");
                return Ok(None);
            }
        };

        match serde_json::from_str::<StaffProfile>(&profile) {
            Ok(profile) => Ok(Some(StaffIdentity::from_parts(token, profile))),
            Err(e) => {
                log::warn!("Unreadable staff profile in storage, ignoring it: {}", e);
                Ok(None)
            }
        }
    }

    /// Exchange credentials for a staff identity
    pub async fn login(&self, username: &str, password: &str) -> Result<StaffIdentity> {
        let response: LoginResponse = self
            .dispatcher
            .post(LOGIN_ENDPOINT, &LoginRequest { username, password })
            .await
            .map_err(|e| classify_auth_failure(e, LOGIN_REJECTION_STATUSES))?;

        if response.access_token.is_empty() {
            return Err(SessionError::Auth(
                "Login response carried an empty token".to_string(),
            ));
        }
        let role: StaffRole = response.role.parse()?;

        let identity = StaffIdentity {
            token: response.access_token,
            role,
            display_name: response.display_name,
        };
        self.save(Some(identity.clone()))?;

        log::info!("Staff login succeeded for '{}' as {}", username, role);
        Ok(identity)
    }

    /// Forget the staff identity. Calling it while logged out is a no-op.
    pub fn logout(&self) -> Result<()> {
        if self.identity.snapshot().is_none() && !self.has_shadow_copy()? {
            return Ok(());
        }
        self.save(None)?;
        log::info!("Staff logged out");
        Ok(())
    }

    pub fn get_token(&self) -> String {
        self.identity.token().unwrap_or_default()
    }

    pub fn identity(&self) -> Option<StaffIdentity> {
        self.identity.snapshot()
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity.token().is_some()
    }

    /// Role of the logged-in staff member
    pub fn role(&self) -> Option<StaffRole> {
        self.identity.read(|identity| identity.map(|i| i.role))
    }

    /// Role the route guard sees: `None` unless a non-empty token is held
    pub fn authenticated_role(&self) -> Option<StaffRole> {
        self.identity.read(|identity| {
            identity
                .filter(|i| !i.token.is_empty())
                .map(|i| i.role)
        })
    }

    pub fn display_name(&self) -> String {
        self.identity
            .read(|identity| identity.map(|i| i.display_name.clone()))
            .unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(StaffRole::Admin)
    }

    pub fn is_teacher(&self) -> bool {
        self.role() == Some(StaffRole::Teacher)
    }

    fn has_shadow_copy(&self) -> Result<bool> {
        Ok(self.storage.get(STAFF_TOKEN_KEY)?.is_some()
            || self.storage.get(STAFF_PROFILE_KEY)?.is_some())
    }

    /// The only mutation path: storage first, memory once storage succeeded
    fn save(&self, identity: Option<StaffIdentity>) -> Result<()> {
        let mut live = self.identity.lock()?;

        let writes = match &identity {
            Some(identity) => vec![
                StorageWrite::set(STAFF_TOKEN_KEY, identity.token.as_str()),
                StorageWrite::set(STAFF_PROFILE_KEY, serde_json::to_string(&identity.profile())?),
            ],
            None => vec![
                StorageWrite::remove(STAFF_TOKEN_KEY),
                StorageWrite::remove(STAFF_PROFILE_KEY),
            ],
        };
        self.storage.apply(&writes)?;

        *live = identity;
        Ok(())
    }
}
