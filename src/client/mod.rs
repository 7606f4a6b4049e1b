//! Outbound request plumbing

pub mod dispatcher;
pub mod exam;
pub mod fallback;
pub mod transport;

// Re-export main components
pub use dispatcher::{RequestDispatcher, TokenResolver, TokenSource};
pub use exam::ExamApi;
pub use fallback::{with_fallback, DegradationPolicy, FallbackOutcome};
pub use transport::{OutboundRequest, ReqwestTransport, Transport};
