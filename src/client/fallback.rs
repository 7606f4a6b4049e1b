//! Try an enhanced operation, degrade to a baseline one
//!
//! Optional-capability endpoints (such as the `-with-analysis` assessment)
//! signal that the capability is switched off with a 503 or a recognisable
//! error body. Only that signal triggers the baseline call; every other
//! failure, including anything that never got a server response, reaches the
//! caller unchanged.

use std::future::Future;

use crate::constants::{CAPABILITY_UNAVAILABLE_MARKERS, CAPABILITY_UNAVAILABLE_STATUS};
use crate::error::{Result, SessionError};

/// Decides whether a failure means "capability unavailable"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradationPolicy {
    statuses: Vec<u16>,
    markers: Vec<String>,
}

impl Default for DegradationPolicy {
    fn default() -> Self {
        Self {
            statuses: vec![CAPABILITY_UNAVAILABLE_STATUS],
            markers: CAPABILITY_UNAVAILABLE_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}

impl DegradationPolicy {
    pub fn new(statuses: Vec<u16>, markers: Vec<String>) -> Self {
        Self { statuses, markers }
    }

    /// Status codes only, no message matching
    pub fn status_only(statuses: Vec<u16>) -> Self {
        Self {
            statuses,
            markers: Vec::new(),
        }
    }

    pub fn recognizes(&self, error: &SessionError) -> bool {
        match error {
            SessionError::CapabilityUnavailable(_) => true,
            SessionError::Transport(err) => {
                // No status means the server never answered
                let Some(status) = err.status else {
                    return false;
                };
                if self.statuses.contains(&status) {
                    return true;
                }
                // Markers only count when the server wrote them
                let Some(text) = err.detail().or_else(|| err.body.as_ref()?.as_str()) else {
                    return false;
                };
                self.markers.iter().any(|marker| text.contains(marker.as_str()))
            }
            _ => false,
        }
    }
}

/// Result of a wrapped call
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackOutcome<T> {
    pub value: T,
    /// True when the baseline operation produced `value`
    pub degraded: bool,
}

/// Run `enhanced(input)`; on a recognised degradation signal run
/// `baseline(input)` with the identical input instead.
pub async fn with_fallback<I, T, E, EF, B, BF>(
    input: I,
    enhanced: E,
    baseline: B,
    policy: &DegradationPolicy,
) -> Result<FallbackOutcome<T>>
where
    I: Clone,
    E: FnOnce(I) -> EF,
    EF: Future<Output = Result<T>>,
    B: FnOnce(I) -> BF,
    BF: Future<Output = Result<T>>,
{
    match enhanced(input.clone()).await {
        Ok(value) => Ok(FallbackOutcome {
            value,
            degraded: false,
        }),
        Err(e) if policy.recognizes(&e) => {
            log::warn!("Enhanced operation unavailable, using baseline: {}", e);
            let value = baseline(input).await?;
            Ok(FallbackOutcome {
                value,
                degraded: true,
            })
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn failure(status: u16, detail: &str) -> SessionError {
        TransportError::new("http://x/api/exams/E1/assess-with-analysis", Some(status), "error")
            .with_body(json!({ "detail": detail }))
            .into()
    }

    #[test]
    fn test_policy_recognizes_status_and_markers() {
        let policy = DegradationPolicy::default();
        assert!(policy.recognizes(&failure(503, "down")));
        assert!(policy.recognizes(&failure(502, "AI 分析服務呼叫失敗")));
        assert!(policy.recognizes(&failure(500, "the analysis service is disabled")));
        assert!(policy.recognizes(&SessionError::CapabilityUnavailable("off".into())));

        assert!(!policy.recognizes(&failure(422, "exam_id in body does not match URL")));
        assert!(!policy.recognizes(&failure(500, "internal")));
        assert!(!policy.recognizes(&SessionError::Auth("AI".into())));
    }

    #[test]
    fn test_plain_text_body_carries_markers() {
        let policy = DegradationPolicy::default();
        let plain = TransportError::new("http://x/api/exams/E1/assess-with-analysis", Some(502), "Bad Gateway")
            .with_body(json!("AI analysis service failed"));
        assert!(policy.recognizes(&plain.into()));
    }

    #[test]
    fn test_unanswered_requests_are_never_degradation() {
        let policy = DegradationPolicy::default();
        let timeout = TransportError::new(
            "http://x/api/exams/AI-2024/assess-with-analysis",
            None,
            "request failed: error sending request for url (http://x/api/exams/AI-2024/assess-with-analysis): operation timed out",
        );
        assert!(!policy.recognizes(&timeout.into()));

        // Reason phrases are not server-written bodies
        let bare = TransportError::new("http://x/api/exams/AI/assess-with-analysis", Some(500), "AI");
        assert!(!policy.recognizes(&bare.into()));
    }

    #[test]
    fn test_status_only_policy_ignores_messages() {
        let policy = DegradationPolicy::status_only(vec![503]);
        assert!(policy.recognizes(&failure(503, "")));
        assert!(!policy.recognizes(&failure(502, "AI 分析服務呼叫失敗")));
    }

    #[tokio::test]
    async fn test_503_runs_baseline_with_same_input() {
        let baseline_calls = AtomicUsize::new(0);

        let outcome = with_fallback(
            json!({ "exam_id": "E1" }),
            |_input| async { Err::<String, _>(failure(503, "AI 分析服務未啟用")) },
            |input| {
                baseline_calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(format!("baseline:{}", input["exam_id"].as_str().unwrap_or(""))) }
            },
            &DegradationPolicy::default(),
        )
        .await
        .unwrap();

        assert!(outcome.degraded);
        assert_eq!(outcome.value, "baseline:E1");
        assert_eq!(baseline_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_422_propagates_without_baseline() {
        let baseline_calls = AtomicUsize::new(0);

        let result = with_fallback(
            (),
            |_| async { Err::<(), _>(failure(422, "exam_id in body does not match URL")) },
            |_| {
                baseline_calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            },
            &DegradationPolicy::default(),
        )
        .await;

        assert_eq!(result.unwrap_err().status(), Some(422));
        assert_eq!(baseline_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_baseline_failure_is_propagated() {
        let result = with_fallback(
            (),
            |_| async { Err::<(), _>(failure(503, "")) },
            |_| async { Err(failure(500, "database down")) },
            &DegradationPolicy::default(),
        )
        .await;

        assert_eq!(result.unwrap_err().status(), Some(500));
    }
}
