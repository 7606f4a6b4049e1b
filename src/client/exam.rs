//! Assessment and student exam endpoints
//!
//! Payloads stay as JSON values; only the session layer's concerns (which
//! token goes out, whether analysis degrades) are handled here.

use serde_json::Value;
use std::sync::Arc;
use url::Url;

use super::dispatcher::RequestDispatcher;
use super::fallback::{with_fallback, DegradationPolicy, FallbackOutcome};
use crate::error::{Result, SessionError};

/// Endpoint path from raw segments, each one percent-encoded so an id
/// holding `/` or `?` stays inside its own segment
fn endpoint_path(segments: &[&str]) -> Result<String> {
    let mut url = Url::parse("http://localhost/")
        .map_err(|e| SessionError::Config(format!("Path builder: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| SessionError::Config("Path builder cannot take segments".to_string()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

pub struct ExamApi {
    dispatcher: Arc<RequestDispatcher>,
    policy: DegradationPolicy,
}

impl ExamApi {
    pub fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self {
            dispatcher,
            policy: DegradationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DegradationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `POST /exams/{exam_id}/assess`
    pub async fn submit_assessment(&self, exam_id: &str, payload: &Value) -> Result<Value> {
        self.dispatcher
            .post(&endpoint_path(&["exams", exam_id, "assess"])?, payload)
            .await
    }

    /// `POST /exams/{exam_id}/assess-with-analysis`
    pub async fn submit_assessment_with_analysis(
        &self,
        exam_id: &str,
        payload: &Value,
    ) -> Result<Value> {
        self.dispatcher
            .post(
                &endpoint_path(&["exams", exam_id, "assess-with-analysis"])?,
                payload,
            )
            .await
    }

    /// Assessment with AI analysis when the server offers it, plain
    /// assessment when the analysis capability is switched off
    pub async fn submit_assessment_resilient(
        &self,
        exam_id: &str,
        payload: &Value,
    ) -> Result<FallbackOutcome<Value>> {
        with_fallback(
            payload,
            |payload| self.submit_assessment_with_analysis(exam_id, payload),
            |payload| self.submit_assessment(exam_id, payload),
            &self.policy,
        )
        .await
    }

    /// `GET /student/exam/{session_id}`
    pub async fn exam_questions(&self, session_id: &str) -> Result<Value> {
        self.dispatcher
            .get(&endpoint_path(&["student", "exam", session_id])?, &[])
            .await
    }

    /// `POST /student/exam/{session_id}/submit`
    pub async fn submit_answers(&self, session_id: &str, payload: &Value) -> Result<Value> {
        self.dispatcher
            .post(&endpoint_path(&["student", "exam", session_id, "submit"])?, payload)
            .await
    }

    /// `GET /student/result/{session_id}`
    pub async fn exam_result(&self, session_id: &str) -> Result<Value> {
        self.dispatcher
            .get(&endpoint_path(&["student", "result", session_id])?, &[])
            .await
    }
}
