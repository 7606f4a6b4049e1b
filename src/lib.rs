//! ApexMath Session - client-side authentication and session layer
//!
//! This library keeps the staff and student identities of the ApexMath
//! assessment client, decorates outbound calls with the right bearer token,
//! and decides whether a navigation may proceed.

pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod router;
pub mod storage;

// Re-export main components
pub use config::*;
pub use constants::*;
pub use context::SessionContext;
pub use error::{Result, SessionError, TransportError};
