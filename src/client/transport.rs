//! Pluggable HTTP transport
//!
//! The dispatcher decides what goes on the wire; a transport only carries it.
//! `ReqwestTransport` is the production backend. Tests substitute their own.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

use crate::error::TransportError;

/// A fully resolved outbound call
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Bearer token for the Authorization header, if any
    pub bearer: Option<String>,
}

impl OutboundRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
        }
    }

    pub fn with_query(mut self, query: &[(&str, &str)]) -> Self {
        self.query = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }
}

/// Carries requests to the server and returns the decoded response body
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<Value, TransportError>;

    /// Get the transport name for logging/debugging
    fn transport_name(&self) -> &'static str;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<Value, TransportError> {
        let url = request.url.clone();

        let mut builder = self
            .client
            .request(request.method, &request.url)
            .header(
                "User-Agent",
                format!("apexmath-session/{}", env!("CARGO_PKG_VERSION")),
            );

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(url.clone(), None, format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            TransportError::new(
                url.clone(),
                Some(status.as_u16()),
                format!("failed to read response body: {}", e),
            )
        })?;

        let body = if text.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text)))
        };

        if status.is_success() {
            return Ok(body.unwrap_or(Value::Null));
        }

        let message = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("request error with bad status code {}", status.as_u16()));
        let mut error = TransportError::new(url, Some(status.as_u16()), message);
        error.body = body;
        Err(error)
    }

    fn transport_name(&self) -> &'static str {
        "REQWEST"
    }
}
