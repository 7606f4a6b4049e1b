#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use apexmath_session::client::{OutboundRequest, Transport};
use apexmath_session::config::ClientConfig;
use apexmath_session::router::default_routes;
use apexmath_session::storage::MemoryKeyValueStore;
use apexmath_session::{SessionContext, TransportError};

pub const TEST_ORIGIN: &str = "http://apexmath.test";

type Handler = dyn Fn(&OutboundRequest) -> Result<Value, TransportError> + Send + Sync;

/// Transport that answers from a closure and remembers every request
pub struct RecordingTransport {
    handler: Box<Handler>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl RecordingTransport {
    pub fn new(
        handler: impl Fn(&OutboundRequest) -> Result<Value, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Transport backed by `fake_server`
    pub fn fake_server() -> Arc<Self> {
        Self::new(fake_server)
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> OutboundRequest {
        self.requests().pop().expect("no request was sent")
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.url.trim_start_matches(TEST_ORIGIN).to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: OutboundRequest) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(&request)
    }

    fn transport_name(&self) -> &'static str {
        "RECORDING"
    }
}

fn rejection(request: &OutboundRequest, status: u16, detail: &str) -> TransportError {
    TransportError::new(request.url.clone(), Some(status), "rejected")
        .with_body(json!({ "detail": detail }))
}

/// Minimal stand-in for the ApexMath API
pub fn fake_server(request: &OutboundRequest) -> Result<Value, TransportError> {
    let path = request.url.trim_start_matches(TEST_ORIGIN);
    let body = request.body.clone().unwrap_or(Value::Null);

    match path {
        "/api/auth/login" => {
            let password_ok = body["password"] == "secret";
            match (body["username"].as_str(), password_ok) {
                (Some("admin"), true) => Ok(json!({
                    "access_token": "admin-token",
                    "token_type": "bearer",
                    "role": "admin",
                    "display_name": "系統管理員"
                })),
                (Some("teacher"), true) => Ok(json!({
                    "access_token": "teacher-token",
                    "token_type": "bearer",
                    "role": "teacher",
                    "display_name": "林老師"
                })),
                (Some("parent"), true) => Ok(json!({
                    "access_token": "parent-token",
                    "token_type": "bearer",
                    "role": "parent",
                    "display_name": "家長"
                })),
                _ => Err(rejection(request, 401, "帳號或密碼錯誤")),
            }
        }
        "/api/auth/verify-code" => match body["code"].as_str() {
            Some("ABC123") => Ok(json!({
                "access_token": "t1",
                "token_type": "bearer",
                "exam_id": "E1",
                "session_id": "S1",
                "status": "in_progress"
            })),
            _ => Err(rejection(request, 404, "驗證碼不存在")),
        },
        "/api/exams/E1/assess-with-analysis" => Err(rejection(
            request,
            503,
            "AI 分析服務未啟用（未設定 LLM 客戶端）",
        )),
        "/api/exams/E1/assess" => Ok(json!({ "exam_id": "E1", "total_score": 90 })),
        "/api/exams/E2/assess-with-analysis" => Err(rejection(
            request,
            422,
            "exam_id in body does not match URL",
        )),
        "/api/student/exam/S1" => Ok(json!({ "session_id": "S1", "questions": [] })),
        "/api/boom" => Err(TransportError::new(request.url.clone(), None, "connection reset")),
        _ => Err(rejection(request, 404, "Not Found")),
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::for_testing(TEST_ORIGIN)
}

pub fn context(storage: &MemoryKeyValueStore, transport: &Arc<RecordingTransport>) -> SessionContext {
    SessionContext::with_transport(
        test_config(),
        Arc::new(storage.clone()),
        transport.clone(),
        default_routes(),
    )
    .expect("context should build")
}
