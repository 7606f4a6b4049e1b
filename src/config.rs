//! Client configuration module
//! Resolves the API base address and local storage location from the environment

use crate::constants::{API_BASE_PATH, DEFAULT_ORIGIN, DEFAULT_STORAGE_PATH};
use crate::error::{Result, SessionError};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Client configuration parameters
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Externally configured API address, `None` for same-origin deployment
    pub api_base_url: Option<String>,
    /// Origin that relative API paths are resolved against
    pub origin: String,
    /// Location of the durable key-value file
    pub storage_path: PathBuf,
    /// Handed to the transport untouched; the session layer imposes none
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Configuration with a fixed local origin, for tests and demos
    pub fn for_testing(origin: &str) -> Self {
        Self {
            api_base_url: None,
            origin: origin.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            request_timeout: None,
        }
    }

    /// Load configuration from environment variables if available
    pub fn from_env() -> Result<Self> {
        let api_base_url = env::var("APEXMATH_API_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let origin = env::var("APEXMATH_ORIGIN").unwrap_or(DEFAULT_ORIGIN.to_string());

        let storage_path = env::var("APEXMATH_STORAGE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH));

        let request_timeout = match env::var("APEXMATH_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Some(Duration::from_secs(raw.parse().map_err(|_| {
                SessionError::Config(format!(
                    "APEXMATH_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?)),
            Err(_) => None,
        };

        let config = Self {
            api_base_url,
            origin,
            storage_path,
            request_timeout,
        };
        config.endpoint_root()?;
        Ok(config)
    }

    /// Base address every endpoint path is appended to
    pub fn base_url(&self) -> String {
        resolve_base_url(self.api_base_url.as_deref())
    }

    /// Absolute form of `base_url`, joining relative bases onto the origin
    pub fn endpoint_root(&self) -> Result<Url> {
        let base = self.base_url();
        let parsed = match Url::parse(&base) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&self.origin)
                .and_then(|origin| origin.join(&base))
                .map_err(|e| {
                    SessionError::Config(format!("Invalid origin '{}': {}", self.origin, e))
                })?,
            Err(e) => {
                return Err(SessionError::Config(format!(
                    "Invalid API base URL '{}': {}",
                    base, e
                )))
            }
        };

        if parsed.cannot_be_a_base() {
            return Err(SessionError::Config(format!(
                "API base URL '{}' cannot carry endpoint paths",
                parsed
            )));
        }
        Ok(parsed)
    }
}

/// Same-origin deployments use the relative `/api` path; an external address
/// has its trailing separators trimmed before `/api` is appended.
pub fn resolve_base_url(external: Option<&str>) -> String {
    match external.map(str::trim).filter(|v| !v.is_empty()) {
        Some(address) => format!("{}{}", address.trim_end_matches('/'), API_BASE_PATH),
        None => API_BASE_PATH.to_string(),
    }
}
