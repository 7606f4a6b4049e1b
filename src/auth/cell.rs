//! Shared live identity slot
//!
//! The in-memory identity is the source of truth for every derived read.
//! A cell is shared between the store that owns mutations and the request
//! dispatcher that only reads the token.

use std::sync::{Arc, RwLock, RwLockWriteGuard};

use super::identity::BearerIdentity;
use crate::error::Result;

pub struct IdentityCell<T> {
    slot: Arc<RwLock<Option<T>>>,
}

impl<T> Clone for IdentityCell<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Clone> IdentityCell<T> {
    pub fn new(initial: Option<T>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn empty() -> Self {
        Self::new(None)
    }

    /// Copy of the current identity
    pub fn snapshot(&self) -> Option<T> {
        self.read(|identity| identity.cloned())
    }

    /// Evaluate `f` against the current identity. A poisoned lock reads as absent.
    pub fn read<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        match self.slot.read() {
            Ok(guard) => f(guard.as_ref()),
            Err(_) => {
                log::warn!("Identity lock poisoned, treating identity as absent");
                f(None)
            }
        }
    }

    /// Exclusive access for the owning store's save path
    pub(crate) fn lock(&self) -> Result<RwLockWriteGuard<'_, Option<T>>> {
        Ok(self.slot.write()?)
    }
}

impl<T: Clone + BearerIdentity> IdentityCell<T> {
    /// Current token, `None` when absent or empty
    pub fn token(&self) -> Option<String> {
        self.read(|identity| {
            identity
                .map(|identity| identity.token())
                .filter(|token| !token.is_empty())
                .map(str::to_string)
        })
    }
}
