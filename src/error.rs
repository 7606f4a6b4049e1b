use std::error::Error;
use std::fmt;
use std::sync::PoisonError;

/// A failed outbound call, kept exactly as the transport reported it
#[derive(Debug, Clone, PartialEq)]
pub struct TransportError {
    pub url: String,
    /// HTTP status, absent for connection-level failures
    pub status: Option<u16>,
    pub message: String,
    /// Decoded error body, when the server sent JSON
    pub body: Option<serde_json::Value>,
}

impl TransportError {
    pub fn new(url: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            message: message.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The server's `detail` field, if the body carried one
    pub fn detail(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.get("detail"))
            .and_then(|detail| detail.as_str())
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} ({}): {}", self.url, status, self.message),
            None => write!(f, "{}: {}", self.url, self.message),
        }
    }
}

#[derive(Debug)]
pub enum SessionError {
    // Auth errors
    Auth(String),

    // Transport errors
    Transport(TransportError),

    // Degradation signal, resolved by the fallback wrapper
    CapabilityUnavailable(String),

    // Storage errors
    Storage(String),
    Serialization(String),

    // Configuration errors
    Config(String),
}

impl SessionError {
    /// HTTP status of the underlying failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(err) => err.status,
            _ => None,
        }
    }

    pub fn is_capability_unavailable(&self) -> bool {
        matches!(self, Self::CapabilityUnavailable(_))
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(msg) => write!(f, "Authentication error: {}", msg),
            Self::Transport(err) => write!(f, "Transport error: {}", err),
            Self::CapabilityUnavailable(msg) => write!(f, "Capability unavailable: {}", msg),
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
            Self::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for SessionError {}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        SessionError::Transport(err)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map(|url| url.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        let status = err.status().map(|status| status.as_u16());
        SessionError::Transport(TransportError::new(url, status, err.to_string()))
    }
}

// Converting from PoisonError to facilitate poisoned lock handling
impl<T> From<PoisonError<T>> for SessionError {
    fn from(err: PoisonError<T>) -> Self {
        SessionError::Storage(format!("Identity lock poisoned: {}", err))
    }
}

// Generic result type for the session layer
pub type Result<T> = std::result::Result<T, SessionError>;
