//! Application-scoped session owner
//!
//! Built once at start-up. Reads both shadow copies exactly once, wires the
//! shared identity cells into the dispatcher and the stores, and hands out
//! explicit references to every consumer.

use std::sync::Arc;

use crate::auth::{CredentialStore, IdentityCell, StudentSessionStore};
use crate::client::{ExamApi, ReqwestTransport, RequestDispatcher, TokenResolver, Transport};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::router::{default_routes, Navigator, RouteTable};
use crate::storage::KeyValueStore;

pub struct SessionContext {
    config: ClientConfig,
    dispatcher: Arc<RequestDispatcher>,
    credentials: Arc<CredentialStore>,
    student: Arc<StudentSessionStore>,
    navigator: Navigator,
    exams: ExamApi,
}

impl SessionContext {
    /// Context over the reqwest transport and the default route table
    pub fn new(config: ClientConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.request_timeout));
        Self::with_transport(config, storage, transport, default_routes())
    }

    pub fn with_transport(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        routes: RouteTable,
    ) -> Result<Self> {
        let root = config.endpoint_root()?;

        let staff_cell = IdentityCell::new(CredentialStore::restore(storage.as_ref())?);
        let student_cell = IdentityCell::new(StudentSessionStore::restore(storage.as_ref())?);

        log::debug!(
            "Session context over {} via {} transport (staff restored: {}, student restored: {})",
            root,
            transport.transport_name(),
            staff_cell.snapshot().is_some(),
            student_cell.snapshot().is_some()
        );

        let dispatcher = Arc::new(RequestDispatcher::new(
            root,
            transport,
            TokenResolver::new(staff_cell.clone(), student_cell.clone()),
        ));
        let credentials = Arc::new(CredentialStore::new(
            staff_cell,
            Arc::clone(&storage),
            Arc::clone(&dispatcher),
        ));
        let student = Arc::new(StudentSessionStore::new(
            student_cell,
            storage,
            Arc::clone(&dispatcher),
        ));
        let navigator = Navigator::new(routes, Arc::clone(&credentials));
        let exams = ExamApi::new(Arc::clone(&dispatcher));

        Ok(Self {
            config,
            dispatcher,
            credentials,
            student,
            navigator,
            exams,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Arc<RequestDispatcher> {
        &self.dispatcher
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn student(&self) -> &Arc<StudentSessionStore> {
        &self.student
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn exams(&self) -> &ExamApi {
        &self.exams
    }
}
