//! Single chokepoint for outbound calls
//!
//! Every request gets exactly one bearer token, staff first and student as
//! the fallback. Success yields the decoded payload; failure yields the
//! transport's error untouched.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use super::transport::{OutboundRequest, Transport};
use crate::auth::{IdentityCell, StaffIdentity, StudentIdentity};
use crate::error::{Result, SessionError};

/// Which identity supplied the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Staff,
    Student,
}

/// Picks the bearer token for an outbound call
#[derive(Clone)]
pub struct TokenResolver {
    staff: IdentityCell<StaffIdentity>,
    student: IdentityCell<StudentIdentity>,
}

impl TokenResolver {
    pub fn new(
        staff: IdentityCell<StaffIdentity>,
        student: IdentityCell<StudentIdentity>,
    ) -> Self {
        Self { staff, student }
    }

    pub fn select(&self) -> Option<(TokenSource, String)> {
        if let Some(token) = self.staff.token() {
            return Some((TokenSource::Staff, token));
        }
        self.student
            .token()
            .map(|token| (TokenSource::Student, token))
    }
}

pub struct RequestDispatcher {
    root: Url,
    transport: Arc<dyn Transport>,
    tokens: TokenResolver,
}

impl RequestDispatcher {
    pub fn new(root: Url, transport: Arc<dyn Transport>, tokens: TokenResolver) -> Self {
        Self {
            root,
            transport,
            tokens,
        }
    }

    /// Absolute URL for an endpoint path such as `/auth/login`
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.root.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Send a request and return the unwrapped payload
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        query: &[(&str, &str)],
    ) -> Result<Value> {
        let mut request = OutboundRequest::new(method, self.endpoint_url(path)).with_query(query);
        request.body = body;

        match self.tokens.select() {
            Some((source, token)) => {
                log::debug!("{} {} with {:?} token", request.method, path, source);
                request.bearer = Some(token);
            }
            None => log::debug!("{} {} without Authorization", request.method, path),
        }

        self.transport
            .send(request)
            .await
            .map_err(SessionError::Transport)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let payload = self.request(Method::GET, path, None, query).await?;
        decode(payload)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let payload = self.request(Method::POST, path, Some(body), &[]).await?;
        decode(payload)
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        let payload = self.request(Method::PUT, path, Some(body), &[]).await?;
        decode(payload)
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let payload = self.request(Method::DELETE, path, None, &[]).await?;
        decode(payload)
    }
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| {
        SessionError::Serialization(format!("Unexpected response payload: {}", e))
    })
}
