//! Navigation driver
//!
//! Runs the guard once per navigation attempt before the target is committed.
//! Each attempt holds a ticket; when a newer attempt begins, older tickets
//! resolve to `Superseded` and leave the current route untouched.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::guard::{evaluate, RouteDecision};
use super::routes::RouteTable;
use crate::auth::CredentialStore;
use crate::error::{Result, SessionError};

/// Upper bound on guard redirects followed within one navigation
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTicket {
    id: u64,
    target: String,
}

impl NavigationTicket {
    pub fn target(&self) -> &str {
        &self.target
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The view for `route` may render
    Completed {
        route: String,
        redirected_from: Option<String>,
    },
    /// A newer navigation began first; nothing was applied
    Superseded,
    NotFound(String),
}

pub struct Navigator {
    routes: RouteTable,
    credentials: Arc<CredentialStore>,
    generation: AtomicU64,
    current: Mutex<Option<String>>,
}

impl Navigator {
    pub fn new(routes: RouteTable, credentials: Arc<CredentialStore>) -> Self {
        Self {
            routes,
            credentials,
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// Start a navigation towards the route named `target`
    pub fn begin(&self, target: &str) -> NavigationTicket {
        // Bumped under the commit lock so an older ticket cannot commit after this returns
        let _current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        NavigationTicket {
            id,
            target: target.to_string(),
        }
    }

    /// Evaluate the guard for `ticket` and commit the outcome if still current
    pub fn resolve(&self, ticket: NavigationTicket) -> Result<Navigation> {
        if !self.is_current(&ticket) {
            log::debug!("Navigation to '{}' superseded before evaluation", ticket.target);
            return Ok(Navigation::Superseded);
        }

        let role = self.credentials.authenticated_role();
        let mut target = ticket.target.clone();
        let mut hops = 0;

        loop {
            let Some(route) = self.routes.find(&target) else {
                return Ok(Navigation::NotFound(target));
            };

            match evaluate(&route.meta, role) {
                RouteDecision::Allow => break,
                RouteDecision::RedirectTo(next) => {
                    hops += 1;
                    if hops > MAX_REDIRECTS {
                        return Err(SessionError::Config(format!(
                            "Redirect loop while navigating to '{}'",
                            ticket.target
                        )));
                    }
                    log::debug!("Guard redirected '{}' to '{}'", target, next);
                    target = next;
                }
            }
        }

        let mut current = self.current.lock()?;
        if !self.is_current(&ticket) {
            log::debug!("Navigation to '{}' superseded before commit", ticket.target);
            return Ok(Navigation::Superseded);
        }
        *current = Some(target.clone());

        let redirected_from = (target != ticket.target).then(|| ticket.target.clone());
        Ok(Navigation::Completed {
            route: target,
            redirected_from,
        })
    }

    /// Navigate by route name
    pub fn navigate(&self, target: &str) -> Result<Navigation> {
        let ticket = self.begin(target);
        self.resolve(ticket)
    }

    /// Navigate by URL path
    pub fn navigate_path(&self, path: &str) -> Result<Navigation> {
        match self.routes.match_path(path) {
            Some(route) => {
                let name = route.name.clone();
                self.navigate(&name)
            }
            None => Ok(Navigation::NotFound(path.to_string())),
        }
    }

    /// Name of the last committed route
    pub fn current_route(&self) -> Option<String> {
        self.current.lock().ok().and_then(|current| current.clone())
    }

    fn is_current(&self, ticket: &NavigationTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.id
    }
}
